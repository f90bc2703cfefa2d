//! Maestro Core — strategy compiler, symphony schema, preflight validation, deployment.
//!
//! This crate turns an abstract `Strategy` (assets, optional static
//! weights, a rebalance cadence, an optional conditional logic tree) into
//! the nested JSON "symphony" document the execution platform accepts:
//! - Domain types (strategies, operands, conditions, logic trees)
//! - Operand resolver and condition parser for the condition micro-language
//! - Recursive logic-tree compiler and document assembler
//! - Preflight validator mirroring every known remote-schema constraint
//! - Deployment client — the sole network boundary
//!
//! Everything except the deployment client is pure and synchronous; a
//! compile call reads only its input and builds fresh values, so
//! independent strategies compile concurrently with no shared state.

pub mod compiler;
pub mod condition;
pub mod deploy;
pub mod domain;
pub mod exchanges;
pub mod fingerprint;
pub mod operand;
pub mod schema;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types crossing the batch runner's thread
    /// boundary are Send + Sync. Compilation fans out on worker threads,
    /// and the deploy target is shared behind a reference.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Strategy>();
        require_sync::<domain::Strategy>();
        require_send::<domain::LogicTreeNode>();
        require_sync::<domain::LogicTreeNode>();
        require_send::<domain::ConditionDef>();
        require_sync::<domain::ConditionDef>();
        require_send::<domain::SymphonyId>();
        require_sync::<domain::SymphonyId>();

        // Condition micro-language
        require_send::<operand::Operand>();
        require_sync::<operand::Operand>();
        require_send::<condition::Condition>();
        require_sync::<condition::Condition>();

        // Compiler outputs and errors
        require_send::<schema::SchemaNode>();
        require_sync::<schema::SchemaNode>();
        require_send::<compiler::CompiledDocument>();
        require_sync::<compiler::CompiledDocument>();
        require_send::<compiler::CompileError>();
        require_sync::<compiler::CompileError>();
        require_send::<validate::ValidateError>();
        require_sync::<validate::ValidateError>();
        require_send::<validate::PreflightReport>();
        require_sync::<validate::PreflightReport>();

        // Deployment
        require_send::<deploy::DeployMeta>();
        require_sync::<deploy::DeployMeta>();
        require_send::<deploy::DeployError>();
        require_sync::<deploy::DeployError>();
        require_send::<deploy::PlatformClient>();
        require_sync::<deploy::PlatformClient>();
    }
}
