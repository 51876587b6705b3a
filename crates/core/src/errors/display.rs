//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Fetch {
                url,
                message,
                source,
            } => match source {
                Some(cause) => write!(f, "failed to fetch '{url}': {message}: {cause}"),
                None => write!(f, "failed to fetch '{url}': {message}"),
            },
            Error::FileNotFound { path } => {
                write!(f, "file vanished while reading: '{}'", path.display())
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::CommandExecution {
                command,
                args,
                message,
                exit_code,
            } => {
                let args_str = args.join(" ");
                let invocation = if args_str.is_empty() {
                    command.clone()
                } else {
                    format!("{command} {args_str}")
                };
                match exit_code {
                    Some(code) => write!(
                        f,
                        "command '{invocation}' failed with exit code {code}: {message}"
                    ),
                    None => write!(f, "command '{invocation}' failed: {message}"),
                }
            }
            Error::Store { key, message } => {
                write!(f, "result store error for key '{key}': {message}")
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_execution_display() {
        let err = Error::command_execution(
            "git",
            vec!["diff-index".to_string(), "HEAD".to_string()],
            "fatal: bad revision",
            Some(129),
        );
        assert_eq!(
            err.to_string(),
            "command 'git diff-index HEAD' failed with exit code 129: fatal: bad revision"
        );
    }

    #[test]
    fn test_configuration_display() {
        let err = Error::configuration("missing ref name");
        assert_eq!(err.to_string(), "configuration error: missing ref name");
    }
}
