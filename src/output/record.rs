// 该文件是 Guanlan （观澜） 项目的一部分。
// src/output/record.rs - 标注帧记录
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

use std::io::Write;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;

use crate::detector::Detection;
use crate::stats::StatsSnapshot;

#[derive(Error, Debug)]
pub enum RecordError {
  #[error("图像错误: {0}")]
  Image(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
}

/// 标注帧快照记录器
///
/// 把叠加帧按日期目录（YYYY/MM/DD）保存为 PNG，并在记录目录下
/// 追加一行 JSON 检测日志。默认跳过没有检测的帧。
pub struct SnapshotRecorder {
  /// 记录根目录
  directory: PathBuf,
  /// 是否记录所有帧（包括无检测的帧）
  always: bool,
  /// 帧计数器（文件名后缀）
  frame_counter: u16,
}

impl SnapshotRecorder {
  /// 创建一个新的记录器
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
      always: false,
      frame_counter: 0,
    }
  }

  /// 是否记录无检测的帧
  pub fn always(mut self, always: bool) -> Self {
    self.always = always;
    self
  }

  fn next_frame_id(&mut self) -> u16 {
    self.frame_counter = self.frame_counter.wrapping_add(1);
    self.frame_counter
  }

  fn frame_path(&mut self) -> Result<PathBuf, RecordError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.next_frame_id()
    )))
  }

  /// 保存一帧叠加图与对应的检测日志
  ///
  /// 返回保存的路径；帧被跳过时返回 None。
  pub fn save(
    &mut self,
    overlay: &RgbImage,
    detections: &[Detection],
    stats: &StatsSnapshot,
  ) -> Result<Option<PathBuf>, RecordError> {
    if !self.always && detections.is_empty() {
      return Ok(None);
    }

    let path = self.frame_path()?;
    overlay.save(&path)?;

    let line = serde_json::json!({
      "frame": path.file_name().map(|name| name.to_string_lossy().into_owned()),
      "total_detections": stats.total_detections,
      "active_objects": stats.active_objects,
      "fps": stats.fps,
      "last_latency_ms": stats.last_latency_ms,
      "detections": detections
        .iter()
        .map(|det| {
          serde_json::json!({
            "label": det.label,
            "confidence": det.confidence,
            "bbox": [det.x, det.y, det.width, det.height],
          })
        })
        .collect::<Vec<_>>(),
    });

    let mut log = std::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(self.directory.join("detections.jsonl"))?;
    writeln!(log, "{line}")?;

    Ok(Some(path))
  }
}
