//! Template rendering for config files
//!
//! Words passed after `--` on the command line are substituted into the
//! document wherever `{{.CLI_ARGS}}` appears, before the TOML is parsed.

use regex::Regex;
use std::sync::OnceLock;

/// The placeholder as users write it
pub const CLI_ARGS_PLACEHOLDER: &str = "{{.CLI_ARGS}}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*\.CLI_ARGS\s*\}\}").expect("placeholder regex is valid"))
}

/// Substitute CLI args into a config document
///
/// When `keep_placeholder` is set and there are no args, the placeholder is
/// left untouched so listings can show where the args would go.
pub fn render(contents: &str, cli_args: &str, keep_placeholder: bool) -> String {
    if keep_placeholder && cli_args.is_empty() {
        return contents.to_string();
    }

    placeholder_regex()
        .replace_all(contents, regex::NoExpand(cli_args))
        .into_owned()
}
