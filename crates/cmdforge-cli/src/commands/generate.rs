//! `generate <text>`: builds the `ApplicationContext`/`Manager`
//! composition root and runs the five-stage pipeline once.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use cmdforge_audit::FileAuditLog;
use cmdforge_context::DefaultContextGatherer;
use cmdforge_core::app_context::ApplicationContext;
use cmdforge_core::cancel::CancellationToken;
use cmdforge_core::manager::GenerateOptions;
use cmdforge_core::manager::Manager;
use cmdforge_core::model::DangerLevel;
use cmdforge_core::model::ProviderConfig;
use cmdforge_core::traits::CredentialResolver;
use cmdforge_credentials::DefaultCredentialResolver;
use cmdforge_exec::ProcessExecutor;
use cmdforge_safety::DefaultClassifier;
use cmdforge_validator::ProviderResultValidator;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::paths;

const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(cli: &Cli, intent: &str, config_dir: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let provider_name = cli.provider.clone().unwrap_or_else(|| config.default_provider.clone());

    let mut provider_config = config.providers.get(&provider_name).cloned().unwrap_or_else(|| ProviderConfig {
        base_url: String::new(),
        default_model: String::new(),
        api_key: None,
        request_timeout: DEFAULT_EXECUTION_TIMEOUT,
        retry_overrides: None,
    });
    if let Some(model) = &cli.model {
        provider_config.default_model = model.clone();
    }

    let credentials = DefaultCredentialResolver::new(config_dir.to_path_buf());
    provider_config.api_key = credentials
        .retrieve(&provider_name, "api_key")
        .await
        .context("resolving the provider credential")?;

    let provider = cmdforge_providers::build(&provider_name, provider_config).context("building the LLM provider")?;

    let audit = FileAuditLog::new(paths::audit_file(config_dir)).context("opening the audit log")?;

    let app = ApplicationContext::new(
        Arc::new(DefaultContextGatherer::new()),
        provider.clone(),
        Arc::new(DefaultClassifier::new()),
        Arc::new(audit),
        Arc::new(ProcessExecutor::new(DEFAULT_EXECUTION_TIMEOUT)),
        Arc::new(credentials),
        Arc::new(ProviderResultValidator::new(provider)),
    );
    let manager = Manager::new(app);

    let token = CancellationToken::new();
    let skip_confirmation = cli.skip_confirmation || config.user_preferences.skip_confirmation;
    let options = GenerateOptions {
        dry_run: cli.dry_run,
        skip_confirmation,
        // `--skip-confirmation` has no separate ceiling flag on this CLI
        // surface, so it bypasses anything short of Critical; Critical
        // stays non-bypassable regardless, enforced by the classifier
        // itself rather than by this ceiling choice.
        bypass_level: DangerLevel::Dangerous,
        reason: if skip_confirmation { "--skip-confirmation".to_string() } else { String::new() },
        validate_results: !cli.no_validate_results && config.user_preferences.validate_results.unwrap_or(true),
        timeout: DEFAULT_EXECUTION_TIMEOUT,
        user_id: "local".to_string(),
        session_id: "cli".to_string(),
    };

    let result = manager
        .generate_and_execute(&token, intent, options)
        .await
        .context("running the generation pipeline")?;

    print_result(&result, cli.verbose);
    Ok(())
}

fn print_result(result: &cmdforge_core::model::FullResult, verbose: bool) {
    let command = &result.command_result.command;
    println!("command: {}", command.generated);
    println!("danger level: {}", result.command_result.safety.danger_level);

    if verbose {
        for warning in &result.command_result.safety.warnings {
            println!("  warning: {warning}");
        }
    }

    if let Some(dry_run) = &result.dry_run {
        println!("dry-run: {}", dry_run.analysis);
        for prediction in &dry_run.predictions {
            println!("  predicts: {prediction}");
        }
        return;
    }

    if result.requires_confirmation {
        println!("this command requires confirmation; re-run with --skip-confirmation to bypass up to the configured ceiling");
        return;
    }

    if let Some(execution) = &result.execution {
        print!("{}", execution.stdout_string());
        eprint!("{}", execution.stderr_string());
        println!("exit code: {}", execution.exit_code);
    }

    if let Some(validation) = &result.validation {
        if validation.is_correct {
            println!("validation: ok");
        } else {
            println!("validation: {}", validation.explanation);
            if let Some(corrected) = &validation.corrected_command {
                println!("suggested correction: {corrected}");
            }
        }
    }
}
