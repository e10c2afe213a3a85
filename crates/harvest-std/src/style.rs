use console::style;

pub enum Style {
    Path,          // file paths
    Query,         // top-level query names
    Skipped,       // skip reasons
    Failure,       // failure reasons
    Success,       // saved counts
    InfoPrefix,    // "==>" text
    WarningPrefix, // "warning:" text
    ErrorPrefix,   // "error:" text
    SuccessPrefix, // "✓" text
}

impl Style {
    pub fn paint<S: AsRef<str>>(&self, message: S) -> String {
        let message_ref = message.as_ref();

        if is_no_color_set() {
            return message_ref.to_string();
        }

        match &self {
            Style::Path => style(message_ref).bold(),
            Style::Query => style(message_ref).cyan(),
            Style::Skipped => style(message_ref).yellow(),
            Style::Failure => style(message_ref).red(),
            Style::Success | Style::SuccessPrefix => style(message_ref).green(),
            Style::InfoPrefix => style(message_ref).blue().bold(),
            Style::WarningPrefix => style(message_ref).yellow().bold(),
            Style::ErrorPrefix => style(message_ref).red().bold(),
        }
        .to_string()
    }
}

pub fn is_no_color_set() -> bool {
    is_bool_env_var_set("NO_COLOR") || is_bool_env_var_set("HARVEST_NO_COLOR")
}

fn is_bool_env_var_set(key: &str) -> bool {
    !matches!(
        std::env::var(key).as_deref(),
        Err(..) | Ok("") | Ok("0") | Ok("false") | Ok("False") | Ok("FALSE")
    )
}
