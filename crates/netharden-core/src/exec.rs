//! 外部命令执行抽象。
//!
//! 说明：
//! - 上层流程只依赖 [`CommandRunner`]，真实实现位于 `netharden-windows`
//! - 本层不做重试；重试/轮询策略由调用方决定
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::time::Duration;

use thiserror::Error;

/// 一次外部命令调用的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// 进程退出码（被信号终止等情况下为 `None`）。
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// 构造一个退出码为 0、仅包含标准输出的结果。
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stdout: text.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 命令执行错误。
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("启动进程失败: {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("等待进程失败: {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("进程执行超时: {program} ({timeout:?})")]
    Timeout { program: String, timeout: Duration },
}

/// 外部命令执行器。
///
/// 约定：
/// - 启动失败/超时必须以 [`ExecError`] 返回，不允许 panic
/// - 非零退出码不视为错误，由调用方按输出内容判断
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
        (**self).run(program, args)
    }
}
