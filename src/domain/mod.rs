// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：监控记录、数据集、时间范围与运行统计
/// - 搜索（search）：搜索引擎抽象接口与错误分类
/// - 服务（services）：游戏名提取等领域服务
/// - 进度（progress）：管道进度事件的接收契约
///
/// 领域层不依赖任何外部实现，体现纯粹的业务规则。
pub mod models;
pub mod progress;
pub mod search;
pub mod services;
