//! 资格过滤器
//!
//! 纯函数：给定路径、策略和当前的源码后缀集合，判断文件是否应该编译。
//! 不访问文件系统，可以安全地作用于不存在的路径。
//!
//! 判定顺序：
//! 1. 没有路径 → 不编译
//! 2. 后缀不在当前识别的源码后缀里 → 不编译
//! 3. 命中任意一条排除规则 → 不编译
//! 4. 否则编译

use std::fmt;
use std::path::Path;

use warmload_config::{PatternError, PolicyConfig};

use crate::host::SourceSuffixes;

/// 过滤结果及原因
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    /// 加载事件没有可解析的源文件路径
    NoPath,
    UnrecognizedSuffix,
    /// 被第 `index` 条排除规则命中
    Excluded { index: usize, pattern: String },
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Eligible => write!(f, "eligible"),
            Verdict::NoPath => write!(f, "no source path"),
            Verdict::UnrecognizedSuffix => write!(f, "not an interpretable source file"),
            Verdict::Excluded { index, pattern } => {
                write!(f, "excluded by pattern #{index} ({pattern})")
            }
        }
    }
}

fn has_source_suffix(path: &Path, suffixes: &[String]) -> bool {
    let name = path.to_string_lossy();
    suffixes
        .iter()
        .any(|suffix| !suffix.is_empty() && name.ends_with(suffix.as_str()))
}

/// 判定并汇报无法求值的排除规则
///
/// 无法求值的规则按"不匹配"处理，文件仍会被编译。
pub fn evaluate_reporting(
    path: Option<&Path>,
    policy: &PolicyConfig,
    suffixes: &dyn SourceSuffixes,
    mut on_pattern_error: impl FnMut(usize, &PatternError),
) -> Verdict {
    let Some(path) = path else {
        return Verdict::NoPath;
    };

    if !has_source_suffix(path, &suffixes.source_suffixes()) {
        return Verdict::UnrecognizedSuffix;
    }

    for (index, pattern) in policy.exclusions().iter().enumerate() {
        match pattern.evaluate(path) {
            Ok(true) => {
                return Verdict::Excluded {
                    index,
                    pattern: pattern.to_string(),
                }
            }
            Ok(false) => {}
            Err(e) => on_pattern_error(index, &e),
        }
    }

    Verdict::Eligible
}

pub fn evaluate(path: Option<&Path>, policy: &PolicyConfig, suffixes: &dyn SourceSuffixes) -> Verdict {
    evaluate_reporting(path, policy, suffixes, |_, _| {})
}

pub fn is_eligible(path: Option<&Path>, policy: &PolicyConfig, suffixes: &dyn SourceSuffixes) -> bool {
    evaluate(path, policy, suffixes).is_eligible()
}
