//! Store keys for cached task results

use stamp_core::TaskScope;

/// Prefix shared by every task result key
pub const RESULT_KEY_PREFIX: &str = "task-result";

/// Key under which the result of `scope` at `version` is stored
///
/// Scope names never contain `--`, so distinct (scope, version) pairs
/// always produce distinct keys.
pub fn result_key(scope: &TaskScope, version: &str) -> String {
    format!(
        "{RESULT_KEY_PREFIX}--{}--{}--{version}",
        scope.module(),
        scope.task()
    )
}
