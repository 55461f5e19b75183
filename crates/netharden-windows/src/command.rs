//! 外部命令执行（`sc.exe` / `powershell.exe`）。
//!
//! 说明：
//! - 以 `CREATE_NO_WINDOW` 启动子进程，避免弹出控制台窗口
//! - stdout/stderr 在独立线程中读取，避免管道写满导致子进程阻塞
//! - 超时后强制结束子进程并返回 [`ExecError::Timeout`]
//! - 截止时间同样约束管道读取：孙进程继承管道不退出时，不会无限等待 EOF
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use netharden_core::exec::{CommandOutput, CommandRunner, ExecError};
use tracing::{debug, warn};

const WAIT_SLICE: Duration = Duration::from_millis(50);

/// 带统一超时的系统命令执行器。
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemCommandRunner {
    /// 启动进程并等待结束。
    ///
    /// 异常处理：
    /// - 启动失败：返回 `Spawn`（通常是路径错误或系统缺失该工具）
    /// - 超时：结束子进程后返回 `Timeout`；读取线程不再等待
    /// - 子进程已退出但管道在截止时间内未关闭（被后台孙进程持有）：返回 `Timeout`
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
        debug!("执行命令: {program} {}", args.join(" "));
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console_window(&mut cmd);

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: program.to_string(),
            source,
        })?;
        let deadline = Instant::now() + self.timeout;
        let (tx, rx) = mpsc::channel();
        let mut pending = 0;
        if let Some(pipe) = child.stdout.take() {
            spawn_reader(Stream::Stdout, pipe, tx.clone());
            pending += 1;
        }
        if let Some(pipe) = child.stderr.take() {
            spawn_reader(Stream::Stderr, pipe, tx.clone());
            pending += 1;
        }
        drop(tx);

        let exit_code = wait_with_deadline(&mut child, program, self.timeout, deadline)?;
        let Some((stdout, stderr)) = collect_output(&rx, pending, deadline) else {
            warn!("命令已退出但输出管道未关闭，按超时处理: {program}");
            return Err(ExecError::Timeout {
                program: program.to_string(),
                timeout: self.timeout,
            });
        };
        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn wait_with_deadline(
    child: &mut Child,
    program: &str,
    timeout: Duration,
    deadline: Instant,
) -> Result<Option<i32>, ExecError> {
    loop {
        let status = child.try_wait().map_err(|source| ExecError::Wait {
            program: program.to_string(),
            source,
        })?;
        if let Some(status) = status {
            return Ok(status.code());
        }
        if Instant::now() >= deadline {
            warn!("命令超时，结束进程: {program}");
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExecError::Timeout {
                program: program.to_string(),
                timeout,
            });
        }
        thread::sleep(WAIT_SLICE);
    }
}

fn spawn_reader<R: Read + Send + 'static>(stream: Stream, mut pipe: R, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send((stream, buf));
    });
}

/// 在截止时间内收齐所有读取线程的输出，返回 (stdout, stderr)；超出截止时间返回 `None`。
fn collect_output(rx: &Receiver<(Stream, Vec<u8>)>, pending: usize, deadline: Instant) -> Option<(String, String)> {
    let (mut stdout, mut stderr) = (String::new(), String::new());
    for _ in 0..pending {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((stream, bytes)) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                match stream {
                    Stream::Stdout => stdout = text,
                    Stream::Stderr => stderr = text,
                }
            }
            Err(RecvTimeoutError::Timeout) => return None,
            // 读取线程异常退出：余下输出按空处理
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Some((stdout, stderr))
}

#[cfg(windows)]
fn hide_console_window(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::CREATE_NO_WINDOW;

    cmd.creation_flags(CREATE_NO_WINDOW.0);
}

#[cfg(not(windows))]
fn hide_console_window(_cmd: &mut Command) {}
