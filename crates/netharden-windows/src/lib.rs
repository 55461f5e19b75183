//! Windows 平台能力封装（外部命令、注册表、提权检测、进程信息）。
//!
//! 目标：
//! - 为 `netharden-core` 中的抽象接口提供真实实现，业务流程不直接依赖 Win32 细节
//! - 统一错误风格：接口实现返回核心库定义的错误类型，其余以 `anyhow::Result` 返回
//!
//! 安全注意：
//! - 修改服务启动类型、写入 HKLM 需要管理员权限
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod command;
pub mod elevation;
pub mod process;
pub mod registry;
