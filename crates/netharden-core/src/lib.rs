//! 网络加固工具核心库（与平台 API 解耦）。
//!
//! 功能：
//! - 定义服务清单、端口参照表与运行配置（netharden.json）
//! - 定义外部命令执行与注册表访问的抽象接口（便于替换为脚本化实现进行测试）
//! - 实现服务启动类型切换、NetBIOS 开关、监听端口分类三类流程
//! - 定义各入口操作返回的报告结构（所有故障均以文本形式收敛到报告中）
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod catalog;
pub mod config;
pub mod exec;
pub mod markers;
pub mod netbios;
pub mod ops;
pub mod ports;
pub mod report;
pub mod services;
