//! # Structured Logging
//!
//! Span helpers for lifecycle operations.

/// Create a tracing span for one lifecycle operation on a resource.
///
/// ```rust,ignore
/// let span = resource_span!("incapsula_user", "create");
/// let span = resource_span!("incapsula_certificate", "read", site_id = "100");
/// ```
#[macro_export]
macro_rules! resource_span {
    ($resource_type:expr, $operation:expr) => {
        tracing::info_span!(
            "resource_operation",
            resource_type = %$resource_type,
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($resource_type:expr, $operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "resource_operation",
            resource_type = %$resource_type,
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        let _span = resource_span!("incapsula_user", "create");
        let _span = resource_span!("incapsula_certificate", "read", site_id = "100");
    }
}
