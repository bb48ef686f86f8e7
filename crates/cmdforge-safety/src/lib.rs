//! C4 — Safety Classifier.
//!
//! Grounded in `vtcode-core`'s `command_safety` evaluator for the overall
//! shape (cheap rejects first, then a registry of rules, then an audit
//! write) and in `cratos`'s categorized blocked-command tables for how a
//! pattern table should be grouped. Matching is purely syntactic: no
//! command in this crate is ever executed.

mod patterns;
mod refine;
mod tokenize;

use async_trait::async_trait;
use cmdforge_core::error::AppResult;
use cmdforge_core::model::AuditAction;
use cmdforge_core::model::AuditEntry;
use cmdforge_core::model::DangerLevel;
use cmdforge_core::model::SafetyResult;
use cmdforge_core::traits::AuditLog;
use cmdforge_core::traits::ClassifyOptions;
use cmdforge_core::traits::SafetyClassifier;
use chrono::Utc;
use tracing::instrument;

/// Pattern-table-backed [`SafetyClassifier`]. Stateless: the table in
/// [`patterns::TABLE`] is built once behind a `Lazy` and never mutated.
#[derive(Debug, Default)]
pub struct DefaultClassifier;

impl DefaultClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SafetyClassifier for DefaultClassifier {
    #[instrument(skip(self))]
    fn classify(&self, command: &str) -> SafetyResult {
        if command.trim().is_empty() {
            return SafetyResult {
                danger_level: DangerLevel::Critical,
                warnings: vec!["empty command".to_string()],
                bypassed: false,
                audit_entry_id: None,
                matched_pattern_ids: vec!["empty-command".to_string()],
            };
        }

        let tokens = tokenize::split(command);
        let mut matched: Vec<(&'static str, &'static str, DangerLevel)> = Vec::new();

        if let Some((level, desc)) = refine::classify_rm(&tokens) {
            matched.push(("rm-delete", desc, level));
        }
        if let Some((level, desc)) = refine::classify_dd(&tokens) {
            matched.push(("dd-block-device", desc, level));
        }
        if let Some((level, desc)) = refine::classify_chmod(&tokens) {
            matched.push(("chmod-weaken", desc, level));
        }
        for pattern in patterns::TABLE.iter() {
            if pattern.is_match(command) {
                matched.push((pattern.id, pattern.description, pattern.level));
            }
        }

        let danger_level = matched.iter().map(|(_, _, level)| *level).max().unwrap_or(DangerLevel::Safe);
        let warnings = matched.iter().map(|(_, desc, _)| desc.to_string()).collect();
        let matched_pattern_ids = matched.iter().map(|(id, _, _)| id.to_string()).collect();

        SafetyResult {
            danger_level,
            warnings,
            bypassed: false,
            audit_entry_id: None,
            matched_pattern_ids,
        }
    }

    #[instrument(skip(self, audit))]
    async fn validate_with_options(
        &self,
        command: &str,
        options: &ClassifyOptions,
        audit: &dyn AuditLog,
    ) -> AppResult<SafetyResult> {
        let mut result = self.classify(command);

        let action = if !result.requires_confirmation() {
            AuditAction::Validated
        } else if options.skip_confirmation
            && result.danger_level != DangerLevel::Critical
            && result.danger_level <= options.bypass_level
        {
            result.bypassed = true;
            AuditAction::Bypassed
        } else {
            // Critical is never bypassable even when skip_confirmation is
            // set; this is the stricter of two otherwise defensible
            // policies.
            AuditAction::Denied
        };

        let reason = match action {
            AuditAction::Bypassed => options.reason.clone(),
            AuditAction::Denied if options.skip_confirmation => {
                "bypass refused: danger level is critical".to_string()
            }
            AuditAction::Denied => "confirmation required".to_string(),
            _ => "no confirmation required".to_string(),
        };

        // AuditEntry carries no synthetic id in this model; correlation is
        // by (timestamp, command, user_id) instead, so audit_entry_id stays
        // unset.
        audit
            .append(AuditEntry {
                timestamp: Utc::now(),
                command: command.to_string(),
                user_id: options.user_id.clone(),
                session_id: options.session_id.clone(),
                action,
                danger_level: result.danger_level,
                reason,
            })
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdforge_core::model::AuditFilter;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryAudit {
        entries: Mutex<Vec<AuditEntry>>,
    }

    #[async_trait]
    impl AuditLog for MemoryAudit {
        async fn append(&self, entry: AuditEntry) -> AppResult<()> {
            self.entries.lock().unwrap().push(entry);
            Ok(())
        }

        async fn read(&self, filter: &AuditFilter) -> AppResult<Vec<AuditEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| filter.matches(e))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn empty_command_is_critical() {
        let classifier = DefaultClassifier::new();
        let result = classifier.classify("   ");
        assert_eq!(result.danger_level, DangerLevel::Critical);
    }

    #[test]
    fn plain_echo_is_safe() {
        let classifier = DefaultClassifier::new();
        let result = classifier.classify("echo hello");
        assert!(result.is_safe());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn maximality_takes_the_highest_matched_level() {
        // sudo alone is Dangerous; chained with a root rm it must report
        // the higher level, not the first match.
        let classifier = DefaultClassifier::new();
        let result = classifier.classify("sudo rm -rf /");
        assert_eq!(result.danger_level, DangerLevel::Critical);
        assert!(result.matched_pattern_ids.len() >= 2);
    }

    #[test]
    fn context_downgrades_relative_rm() {
        let classifier = DefaultClassifier::new();
        let result = classifier.classify("rm -rf ./build");
        assert_eq!(result.danger_level, DangerLevel::Dangerous);
    }

    #[tokio::test]
    async fn bypass_ceiling_refuses_critical() {
        let classifier = DefaultClassifier::new();
        let audit = MemoryAudit::default();
        let options = ClassifyOptions {
            skip_confirmation: true,
            reason: "automation".to_string(),
            ..Default::default()
        };

        let result = classifier.validate_with_options("rm -rf /", &options, &audit).await.unwrap();
        assert!(!result.bypassed);
        assert!(result.requires_confirmation());

        let entries = audit.read(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Denied);
    }

    #[tokio::test]
    async fn bypass_ceiling_allows_dangerous() {
        let classifier = DefaultClassifier::new();
        let audit = MemoryAudit::default();
        let options = ClassifyOptions {
            skip_confirmation: true,
            bypass_level: DangerLevel::Dangerous,
            reason: "automation".to_string(),
            ..Default::default()
        };

        let result = classifier
            .validate_with_options("sudo systemctl restart nginx", &options, &audit)
            .await
            .unwrap();
        assert!(result.bypassed);

        let entries = audit.read(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries[0].action, AuditAction::Bypassed);
    }

    #[tokio::test]
    async fn safe_command_is_validated_without_bypass() {
        let classifier = DefaultClassifier::new();
        let audit = MemoryAudit::default();
        let result = classifier
            .validate_with_options("echo hi", &ClassifyOptions::default(), &audit)
            .await
            .unwrap();
        assert!(!result.bypassed);
        let entries = audit.read(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries[0].action, AuditAction::Validated);
    }
}
