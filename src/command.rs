use crate::config;

/// A classified inbound message. Constructed per message, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    UpdateEnv { key: String, value: String },
    CreateUser,
    GetToken,
    Unknown,
}

/// Argument validation failures, caught before any side effect runs.
/// Distinct from [`Command::Unknown`]: the command was recognized but its
/// arguments are unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    UpdateEnvUsage,
    InvalidKey,
}

impl CommandError {
    pub fn reply(&self) -> &'static str {
        match self {
            CommandError::UpdateEnvUsage => "⚠️ Usage: /update_env <var> <value>",
            CommandError::InvalidKey => {
                "❌ The variable name must use uppercase letters and _ only."
            }
        }
    }
}

/// Classify raw message text into a [`Command`], matching prefixes in
/// fixed priority order.
pub fn classify(text: &str) -> Result<Command, CommandError> {
    if text.starts_with("/start") {
        Ok(Command::Start)
    } else if text.starts_with("/update_env") {
        classify_update_env(text)
    } else if text.starts_with("/create_user") {
        Ok(Command::CreateUser)
    } else if text.starts_with("/get_token") {
        Ok(Command::GetToken)
    } else {
        Ok(Command::Unknown)
    }
}

/// Split `/update_env KEY value...` into exactly three tokens. The value
/// keeps whatever whitespace it embeds; only the separators before it are
/// consumed.
fn classify_update_env(text: &str) -> Result<Command, CommandError> {
    let (_, rest) = next_token(text).ok_or(CommandError::UpdateEnvUsage)?;
    let (key, rest) = next_token(rest).ok_or(CommandError::UpdateEnvUsage)?;
    let value = rest.trim_start();
    if value.is_empty() {
        return Err(CommandError::UpdateEnvUsage);
    }
    if !config::is_valid_key(key) {
        return Err(CommandError::InvalidKey);
    }
    Ok(Command::UpdateEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_start() {
        assert_eq!(classify("/start").unwrap(), Command::Start);
    }

    #[test]
    fn test_classify_create_user_and_get_token() {
        assert_eq!(classify("/create_user").unwrap(), Command::CreateUser);
        assert_eq!(classify("/get_token").unwrap(), Command::GetToken);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("/help").unwrap(), Command::Unknown);
        assert_eq!(classify("hello there").unwrap(), Command::Unknown);
    }

    #[test]
    fn test_update_env_splits_into_three() {
        assert_eq!(
            classify("/update_env FOO bar").unwrap(),
            Command::UpdateEnv {
                key: "FOO".to_string(),
                value: "bar".to_string()
            }
        );
    }

    #[test]
    fn test_update_env_value_keeps_embedded_spaces() {
        assert_eq!(
            classify("/update_env FOO bar baz").unwrap(),
            Command::UpdateEnv {
                key: "FOO".to_string(),
                value: "bar baz".to_string()
            }
        );
    }

    #[test]
    fn test_update_env_missing_value_is_usage_error() {
        assert_eq!(
            classify("/update_env FOO").unwrap_err(),
            CommandError::UpdateEnvUsage
        );
        assert_eq!(
            classify("/update_env").unwrap_err(),
            CommandError::UpdateEnvUsage
        );
        assert_eq!(
            classify("/update_env FOO   ").unwrap_err(),
            CommandError::UpdateEnvUsage
        );
    }

    #[test]
    fn test_update_env_lowercase_key_is_invalid() {
        assert_eq!(
            classify("/update_env foo bar").unwrap_err(),
            CommandError::InvalidKey
        );
    }

    #[test]
    fn test_update_env_digits_in_key_are_invalid() {
        assert_eq!(
            classify("/update_env KEY1 bar").unwrap_err(),
            CommandError::InvalidKey
        );
    }

    #[test]
    fn test_validation_errors_have_distinct_replies() {
        assert_ne!(
            CommandError::UpdateEnvUsage.reply(),
            CommandError::InvalidKey.reply()
        );
    }
}
