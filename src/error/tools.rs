//! Collaborator tool errors

use super::JarpatchError;

pub fn disassembly_failed(member: impl Into<String>, reason: impl Into<String>) -> JarpatchError {
    JarpatchError::DisassemblyFailed {
        member: member.into(),
        reason: reason.into(),
    }
}

pub fn assembly_failed(member: impl Into<String>, reason: impl Into<String>) -> JarpatchError {
    JarpatchError::AssemblyFailed {
        member: member.into(),
        reason: reason.into(),
    }
}

pub fn diff_failed(reason: impl Into<String>) -> JarpatchError {
    JarpatchError::DiffExecutionFailed {
        reason: reason.into(),
    }
}

pub fn patch_failed(reason: impl Into<String>) -> JarpatchError {
    JarpatchError::PatchApplicationFailed {
        reason: reason.into(),
    }
}
