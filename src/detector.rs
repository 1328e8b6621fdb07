// 该文件是 Guanlan （观澜） 项目的一部分。
// src/detector.rs - 检测结果与置信度过滤
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

use crate::model::RawPrediction;

/// 检测结果
///
/// 每周期重新生成，生成后不再修改。
#[derive(Clone, Debug)]
pub struct Detection {
  /// 类别名称
  pub label: String,
  /// 置信度
  pub confidence: f32,
  /// 边界框左上角 x 坐标
  pub x: f32,
  /// 边界框左上角 y 坐标
  pub y: f32,
  /// 边界框宽度
  pub width: f32,
  /// 边界框高度
  pub height: f32,
}

impl From<RawPrediction> for Detection {
  fn from(raw: RawPrediction) -> Self {
    let [x, y, width, height] = raw.bbox;
    Self {
      label: raw.class,
      confidence: raw.score,
      x,
      y,
      width,
      height,
    }
  }
}

/// 置信度过滤与截断
///
/// 保留分数不低于阈值的预测（阈值本身保留），按引擎原始相对顺序
/// 截取前 max_detections 个，绝不按分数重排。
/// 阈值为 1.0 或 max_detections 为 0 时产生空集，不是错误。
pub fn filter_predictions(
  raw: Vec<RawPrediction>,
  threshold: f32,
  max_detections: usize,
) -> Vec<Detection> {
  raw
    .into_iter()
    .filter(|prediction| prediction.score >= threshold)
    .take(max_detections)
    .map(Detection::from)
    .collect()
}
