//! 编译与重载错误类型
//!
//! 两者都不会从引擎传播出去：编译错误在本地恢复并转成通知，
//! 重载错误属于宿主的异步设施。

use std::path::PathBuf;
use thiserror::Error;

/// 编译器拒绝或无法编译源文件
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// 源码有误
    #[error("compiler rejected '{}': {message}", .path.display())]
    Rejected { path: PathBuf, message: String },

    /// 读写源码或产物时出错
    #[error("I/O error while compiling '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// 编译器内部 panic
    #[error("compiler panicked on '{}': {message}", .path.display())]
    Panicked { path: PathBuf, message: String },
}

impl CompileError {
    /// 出错的源文件
    pub fn path(&self) -> &std::path::Path {
        match self {
            CompileError::Rejected { path, .. }
            | CompileError::Io { path, .. }
            | CompileError::Panicked { path, .. } => path,
        }
    }
}

/// 异步加载编译产物失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReloadError {
    #[error("failed to load artifact '{}': {message}", .artifact.display())]
    Failed { artifact: PathBuf, message: String },
}
