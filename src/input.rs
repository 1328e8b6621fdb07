// 该文件是 Guanlan （观澜） 项目的一部分。
// src/input.rs - 帧来源
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

use std::time::Instant;

use image::{ImageBuffer, Rgb, RgbImage};

/// 帧数据
#[derive(Debug, Clone)]
pub struct Frame {
  /// RGB 图像数据
  pub image: RgbImage,
  /// 帧索引
  pub index: u64,
  /// 时间戳（毫秒）
  pub timestamp_ms: u64,
}

/// 帧来源 trait
///
/// 帧来源始终持有最新的一帧；`current_frame` 不会阻塞等待新帧。
pub trait FrameSource {
  /// 帧来源是否就绪
  fn is_ready(&self) -> bool;

  /// 帧尺寸（就绪后固定，用于确定叠加层画布大小）
  fn dimensions(&self) -> (u32, u32);

  /// 获取当前最新帧
  fn current_frame(&mut self) -> Frame;
}

/// 合成帧来源
///
/// 按帧索引生成确定性的渐变图像，供演示程序与测试使用，
/// 不依赖任何摄像头或视频文件。
pub struct SyntheticSource {
  /// 帧宽度
  width: u32,
  /// 帧高度
  height: u32,
  /// 下一帧索引
  frame_index: u64,
  /// 启动时刻（用于时间戳）
  started: Instant,
}

impl SyntheticSource {
  /// 创建一个新的合成帧来源
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      frame_index: 0,
      started: Instant::now(),
    }
  }

  /// 生成第 index 帧的图像内容
  fn generate(&self, index: u64) -> RgbImage {
    let phase = (index % 256) as u32;
    ImageBuffer::from_fn(self.width, self.height, |x, y| {
      let r = ((x + phase) % 256) as u8;
      let g = ((y + phase) % 256) as u8;
      let b = ((x + y) % 256) as u8;
      Rgb([r, g, b])
    })
  }
}

impl FrameSource for SyntheticSource {
  fn is_ready(&self) -> bool {
    self.width > 0 && self.height > 0
  }

  fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn current_frame(&mut self) -> Frame {
    let index = self.frame_index;
    self.frame_index += 1;

    Frame {
      image: self.generate(index),
      index,
      timestamp_ms: self.started.elapsed().as_millis() as u64,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn synthetic_source_reports_readiness() {
    assert!(SyntheticSource::new(64, 48).is_ready());
    assert!(!SyntheticSource::new(0, 48).is_ready());
  }

  #[test]
  fn synthetic_source_counts_frames() {
    let mut source = SyntheticSource::new(32, 32);
    let first = source.current_frame();
    let second = source.current_frame();

    assert_eq!(first.index, 0);
    assert_eq!(second.index, 1);
    assert_eq!(first.image.dimensions(), (32, 32));
  }
}
