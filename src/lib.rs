// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 爬虫上下文与爬取用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// HTTP 传输实现
pub mod engines;

/// 基础设施模块
///
/// 托管平台、索引存储、本地文件、git 和指标的具体实现
pub mod infrastructure;

/// 队列模块
///
/// 入口通道、仓库生产者和黑名单过滤器
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 固定大小的仓库工作器池
pub mod workers;
