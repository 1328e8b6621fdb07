// 该文件是 Guanlan （观澜） 项目的一部分。
// src/model.rs - 推理引擎
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

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;

use crate::input::Frame;

/// 引擎输出的原始预测，顺序由引擎决定，未按分数排序
#[derive(Debug, Clone)]
pub struct RawPrediction {
  /// 类别名称
  pub class: String,
  /// 置信度分数
  pub score: f32,
  /// 边界框 [x, y, width, height]（帧像素坐标）
  pub bbox: [f32; 4],
}

#[derive(Error, Debug)]
pub enum EngineError {
  #[error("模型在 {0:?} 内未能就绪")]
  ModelUnavailable(Duration),
  #[error("推理失败: {0}")]
  Detection(String),
}

/// 推理引擎 trait
pub trait InferenceEngine {
  /// 一次性加载模型，超时则失败
  fn load(&mut self, timeout: Duration) -> Result<(), EngineError>;

  /// 引擎是否就绪
  fn is_ready(&self) -> bool;

  /// 对单帧运行推理（周期内唯一的阻塞点）
  fn detect(&mut self, frame: &Frame) -> Result<Vec<RawPrediction>, EngineError>;
}

/// 桩引擎
///
/// 两种工作模式：`synthetic` 按帧索引生成确定性的移动目标，
/// 供演示程序使用；`scripted` 按脚本逐周期返回预设结果，供测试使用。
pub struct StubEngine {
  /// 是否就绪
  ready: bool,
  /// 加载是否会成功
  loadable: bool,
  /// 预设脚本（None 表示合成模式）
  script: Option<VecDeque<Result<Vec<RawPrediction>, EngineError>>>,
}

impl StubEngine {
  /// 合成模式：加载后按帧索引生成移动目标
  pub fn synthetic() -> Self {
    Self {
      ready: false,
      loadable: true,
      script: None,
    }
  }

  /// 脚本模式：逐周期弹出预设结果，脚本耗尽后返回空集；创建即就绪
  pub fn scripted(cycles: Vec<Result<Vec<RawPrediction>, EngineError>>) -> Self {
    Self {
      ready: true,
      loadable: true,
      script: Some(cycles.into()),
    }
  }

  /// 模拟不可用的模型：加载必然超时失败
  pub fn unavailable() -> Self {
    Self {
      ready: false,
      loadable: false,
      script: None,
    }
  }
}

impl InferenceEngine for StubEngine {
  fn load(&mut self, timeout: Duration) -> Result<(), EngineError> {
    if !self.loadable {
      return Err(EngineError::ModelUnavailable(timeout));
    }
    self.ready = true;
    Ok(())
  }

  fn is_ready(&self) -> bool {
    self.ready
  }

  fn detect(&mut self, frame: &Frame) -> Result<Vec<RawPrediction>, EngineError> {
    if !self.ready {
      return Err(EngineError::Detection("引擎尚未就绪".into()));
    }

    match &mut self.script {
      Some(script) => script.pop_front().unwrap_or_else(|| Ok(Vec::new())),
      None => Ok(synthetic_predictions(frame)),
    }
  }
}

/// 由帧索引推出确定性的移动目标
fn synthetic_predictions(frame: &Frame) -> Vec<RawPrediction> {
  const CLASSES: [&str; 5] = ["person", "car", "dog", "bicycle", "cat"];

  let w = frame.image.width() as f32;
  let h = frame.image.height() as f32;
  let t = frame.index;

  let count = 2 + (t % 3) as usize;
  (0..count)
    .map(|i| {
      let drift_x = ((t as f32) * 0.05 + i as f32 * 1.3).sin() * 0.5 + 0.5;
      let drift_y = ((t as f32) * 0.03 + i as f32 * 0.7).cos() * 0.5 + 0.5;

      RawPrediction {
        class: CLASSES[(t as usize + i) % CLASSES.len()].to_string(),
        score: 0.35 + 0.06 * (((t as usize + i * 7) % 10) as f32),
        bbox: [drift_x * w * 0.6, drift_y * h * 0.6, w * 0.2, h * 0.2],
      }
    })
    .collect()
}
