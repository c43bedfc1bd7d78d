// Macros file - tracing macros are imported within the macro definitions

/// Standardized logging macros for consistent field names and message patterns across the application
///
/// These macros ensure:
/// - Consistent field naming conventions
/// - Appropriate logging levels for different scenarios
/// - Structured logging with context
/// - Consistent message formatting

// ============================================================================
// API Operation Logging Macros
// ============================================================================

/// Log the start of an API operation with consistent fields
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, owner_id = $owner_id:expr) => {
        tracing::debug!(
            operation = $operation,
            owner_id = %$owner_id,
            "API operation started"
        );
    };
    ($operation:expr, notes_length = $length:expr) => {
        tracing::debug!(
            operation = $operation,
            notes_length = $length,
            "API operation started"
        );
    };
    ($operation:expr) => {
        tracing::debug!(
            operation = $operation,
            "API operation started"
        );
    };
}

/// Log successful completion of an API operation
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, set_id = $set_id:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            set_id = %$set_id,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            "API operation completed: {}", $msg
        );
    };
}

/// Log API operation errors with consistent structure
#[macro_export]
macro_rules! log_api_error {
    ($operation:expr, error = $error:expr, $msg:expr) => {
        tracing::error!(
            operation = $operation,
            error = %$error,
            "API operation failed: {}", $msg
        );
    };
}

// ============================================================================
// Model Call Logging Macros
// ============================================================================

/// Log model calls with consistent structure
#[macro_export]
macro_rules! log_llm_operation {
    (start, $operation:expr, prompt_length = $length:expr) => {
        tracing::info!(
            component = "model_client",
            operation = $operation,
            prompt_length = $length,
            "Model call started"
        );
    };
    (success, $operation:expr, response_length = $length:expr) => {
        tracing::info!(
            component = "model_client",
            operation = $operation,
            response_length = $length,
            "Model call completed successfully"
        );
    };
    (error, $operation:expr, error = $error:expr) => {
        tracing::error!(
            component = "model_client",
            operation = $operation,
            error = %$error,
            "Model call failed"
        );
    };
    (warn, $operation:expr, $msg:expr) => {
        tracing::warn!(
            component = "model_client",
            operation = $operation,
            "Model call warning: {}", $msg
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
