//! 测试辅助工具

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use warmload_api::warmload_core::{Compiler, CompileError, ReloadError};
use warmload_api::warmload_log::{Level, LogRingBuffer, Logger};
use warmload_api::{InProcessHost, PolicyConfig, Warmload, WarmloadConfig};

/// 把 `.el` 编译成 `.eln`；路径包含 `broken` 时失败
#[derive(Default)]
pub struct FakeCompiler {
    pub compiled: Mutex<Vec<PathBuf>>,
}

impl Compiler for FakeCompiler {
    fn compile(&self, source: &Path) -> Result<PathBuf, CompileError> {
        if source.to_string_lossy().contains("broken") {
            return Err(CompileError::Rejected {
                path: source.to_path_buf(),
                message: "invalid read syntax".to_string(),
            });
        }
        self.compiled.lock().unwrap().push(source.to_path_buf());
        Ok(source.with_extension("eln"))
    }
}

pub struct Setup {
    pub host: InProcessHost,
    pub warmload: Warmload,
    pub compiler: Arc<FakeCompiler>,
    pub ring: Arc<LogRingBuffer>,
}

pub fn setup(policy: PolicyConfig) -> Setup {
    let ring = LogRingBuffer::new(256);
    let logger = Logger::new(Level::Info).with_sink(ring.clone());
    let linker = |_: &Path| -> Result<(), ReloadError> { Ok(()) };
    let host = InProcessHost::new(Arc::new(linker), [".el"], logger.clone());
    let compiler = Arc::new(FakeCompiler::default());
    let warmload = Warmload::new(
        host.bindings(compiler.clone()),
        WarmloadConfig::new(policy).with_logger(logger),
    );
    Setup {
        host,
        warmload,
        compiler,
        ring,
    }
}
