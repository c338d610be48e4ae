// Profile macro is defined in macros.rs - this file contains the scoped
// logging utilities.

/// Convenience macro for scoped logging at different levels
#[macro_export]
macro_rules! scoped_log {
    (error, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::ERROR) {
            tracing::error!(scope = $scope, $($arg)*);
        }
    };
    (warn, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::WARN) {
            tracing::warn!(scope = $scope, $($arg)*);
        }
    };
    (info, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::INFO) {
            tracing::info!(scope = $scope, $($arg)*);
        }
    };
    (debug, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::DEBUG) {
            tracing::debug!(scope = $scope, $($arg)*);
        }
    };
    (trace, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::TRACE) {
            tracing::trace!(scope = $scope, $($arg)*);
        }
    };
}

// Convenience macros for common scopes
#[macro_export]
macro_rules! transition_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "transition", $($arg)*);
    };
}

#[macro_export]
macro_rules! mission_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "mission", $($arg)*);
    };
}

#[macro_export]
macro_rules! script_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "script", $($arg)*);
    };
}

#[macro_export]
macro_rules! locomotion_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "locomotion", $($arg)*);
    };
}
