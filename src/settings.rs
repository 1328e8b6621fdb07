// 该文件是 Guanlan （观澜） 项目的一部分。
// src/settings.rs - 会话设置
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::sync::{Arc, RwLock};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
  #[error("置信度阈值超出范围 [0, 1]: {0}")]
  ThresholdOutOfRange(f32),
  #[error("最大检测数必须为正整数")]
  ZeroMaxDetections,
}

/// 会话设置
///
/// 循环每周期以单次快照读取；设置的修改只会在周期之间生效。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
  /// 置信度阈值 [0, 1]
  pub confidence_threshold: f32,
  /// 标签是否附带置信度
  pub show_confidence_label: bool,
  /// 每帧最大检测数
  pub max_detections: usize,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      confidence_threshold: 0.5,
      show_confidence_label: true,
      max_detections: 20,
    }
  }
}

/// 可跨线程共享的设置句柄
///
/// 越界的修改在边界处被拒绝，原值保持不变。
#[derive(Debug, Clone)]
pub struct SharedSettings {
  inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
  /// 以初始设置创建共享句柄
  pub fn new(settings: Settings) -> Self {
    Self {
      inner: Arc::new(RwLock::new(settings)),
    }
  }

  /// 取一次原子快照（周期内阈值与上限不会被撕裂）
  pub fn snapshot(&self) -> Settings {
    *self.inner.read().unwrap()
  }

  /// 设置置信度阈值，取值范围 [0, 1]
  pub fn set_confidence_threshold(&self, value: f32) -> Result<(), SettingsError> {
    if !(0.0..=1.0).contains(&value) {
      return Err(SettingsError::ThresholdOutOfRange(value));
    }
    self.inner.write().unwrap().confidence_threshold = value;
    Ok(())
  }

  /// 设置标签是否附带置信度
  pub fn set_show_confidence_label(&self, value: bool) {
    self.inner.write().unwrap().show_confidence_label = value;
  }

  /// 设置每帧最大检测数，必须为正整数
  pub fn set_max_detections(&self, value: usize) -> Result<(), SettingsError> {
    if value == 0 {
      return Err(SettingsError::ZeroMaxDetections);
    }
    self.inner.write().unwrap().max_detections = value;
    Ok(())
  }
}
