//! User-visible failure reporting: `Application failed: <message>`
//! to stderr, exit 1. Verbose mode additionally walks the wrap chain and
//! prints the context keys attached at each level — never the values, since
//! a context map is the one place a caller-supplied string could land.

use cmdforge_core::error::AppError;

pub fn report(err: &anyhow::Error, verbose: bool) {
    eprintln!("Application failed: {err}");

    if !verbose {
        return;
    }

    for (depth, cause) in err.chain().enumerate() {
        if depth == 0 {
            continue;
        }
        eprintln!("  caused by: {cause}");
        if let Some(app_err) = cause.downcast_ref::<AppError>() {
            print_context_keys(app_err);
        }
    }

    if let Some(app_err) = err.downcast_ref::<AppError>() {
        print_context_keys(app_err);
    }
}

fn print_context_keys(err: &AppError) {
    if err.context.is_empty() {
        return;
    }
    let keys: Vec<&str> = err.context.keys().map(String::as_str).collect();
    eprintln!("  [{}/{}] context keys: {}", err.component, err.operation, keys.join(", "));
}
