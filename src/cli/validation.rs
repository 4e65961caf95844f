use crate::cli::args::CliArgs;
use crate::pager::PageSize;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(size) = args.size {
        PageSize::try_from(size).map_err(|e| format!("invalid --size: {e}"))?;
    }
    if args.page == Some(0) {
        return Err("invalid --page, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid --timeout, expected positive integer".to_string());
    }
    if let Some(url) = args.url.as_deref() {
        reqwest::Url::parse(url.trim()).map_err(|e| format!("invalid --url '{url}': {e}"))?;
    }
    Ok(())
}
