//! 管理员权限检测。
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use anyhow::Result;

/// 判断当前进程是否以管理员权限运行。
///
/// 返回值：
/// - `Ok(true)`：当前为管理员
/// - `Ok(false)`：当前非管理员，或非 Windows 平台
///
/// 安全注意：
/// - 仅用于在修改服务/注册表前提前给出明确提示，真正的权限校验由系统完成。
#[cfg(windows)]
pub fn is_running_as_admin() -> Result<bool> {
    use windows::Win32::UI::Shell::IsUserAnAdmin;

    unsafe { Ok(IsUserAnAdmin().as_bool()) }
}

#[cfg(not(windows))]
pub fn is_running_as_admin() -> Result<bool> {
    Ok(false)
}
