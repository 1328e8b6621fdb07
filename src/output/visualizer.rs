// 该文件是 Guanlan （观澜） 项目的一部分。
// src/output/visualizer.rs - 叠加层可视化
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

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::detector::Detection;

// 文本渲染常量（无字体时的粗略估计）
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_TEXT_HEIGHT: i32 = 20;
const LABEL_CHAR_WIDTH: f32 = 9.0; // 每字符平均宽度（粗略估计）
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const PALETTE_SIZE: usize = 12;

/// 叠加层可视化工具
///
/// 渲染是输入的纯函数：相同的检测集与设置总是产生逐像素一致的输出。
pub struct Visualizer {
  /// 标签字体（可选的运行期资源，缺省时仅绘制标签底色）
  font: Option<FontArc>,
  /// 字体大小
  font_scale: PxScale,
  /// 边界框颜色盘
  palette: Vec<Rgb<u8>>,
}

impl Default for Visualizer {
  fn default() -> Self {
    Self::new()
  }
}

impl Visualizer {
  /// 创建一个新的可视化工具，颜色盘在色相环上均匀展开
  pub fn new() -> Self {
    let palette: Vec<Rgb<u8>> = (0..PALETTE_SIZE)
      .map(|i| {
        let hue = (i as f32 / PALETTE_SIZE as f32) * 360.0;
        Self::hsv_to_rgb(hue, 0.8, 0.9)
      })
      .collect();

    Self {
      font: None,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      palette,
    }
  }

  /// 配置标签字体
  pub fn with_font(mut self, font: FontArc) -> Self {
    self.font = Some(font);
    self
  }

  /// 替换颜色盘，空颜色盘保持原样
  pub fn with_palette(mut self, palette: Vec<Rgb<u8>>) -> Self {
    if !palette.is_empty() {
      self.palette = palette;
    }
    self
  }

  /// HSV 转 RGB
  fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb<u8> {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
      (c, x, 0.0)
    } else if h < 120.0 {
      (x, c, 0.0)
    } else if h < 180.0 {
      (0.0, c, x)
    } else if h < 240.0 {
      (0.0, x, c)
    } else if h < 300.0 {
      (x, 0.0, c)
    } else {
      (c, 0.0, x)
    };

    Rgb([
      ((r + m) * 255.0) as u8,
      ((g + m) * 255.0) as u8,
      ((b + m) * 255.0) as u8,
    ])
  }

  /// 把检测集渲染为叠加帧
  ///
  /// 每次从帧的干净副本开始绘制，不跨帧累积。第 i 个检测使用
  /// `palette[i % palette.len()]`，颜色按位置分配，只在单帧内稳定。
  pub fn render(
    &self,
    frame: &RgbImage,
    detections: &[Detection],
    show_confidence: bool,
  ) -> RgbImage {
    let mut canvas = frame.clone();

    for (i, detection) in detections.iter().enumerate() {
      let color = self.palette[i % self.palette.len()];
      self.draw_detection(&mut canvas, detection, color, show_confidence);
    }

    canvas
  }

  /// 绘制单个检测的边界框与标签
  fn draw_detection(
    &self,
    image: &mut RgbImage,
    detection: &Detection,
    color: Rgb<u8>,
    show_confidence: bool,
  ) {
    let x = detection.x.max(0.0) as i32;
    let y = detection.y.max(0.0) as i32;
    let width = detection.width.min(image.width() as f32 - detection.x) as u32;
    let height = detection.height.min(image.height() as f32 - detection.y) as u32;

    if width > 0 && height > 0 {
      let rect = Rect::at(x, y).of_size(width, height);
      draw_hollow_rect_mut(image, rect, color);

      // 绘制第二个边框以增加可见度；过窄的框只画单层，
      // of_size 要求严格为正的尺寸
      if x > 0 && y > 0 && width > 2 && height > 2 {
        let inner_rect = Rect::at(x + 1, y + 1).of_size(width - 2, height - 2);
        draw_hollow_rect_mut(image, inner_rect, color);
      }
    }

    // 标签底色锚定在边界框左上角上方，可能部分落在画面之外；
    // 越界部分由绘制时的求交处理，这里不做裁剪
    let label = label_text(detection, show_confidence);
    let (text_width, text_height) = self.measure(&label);
    let label_y = y - text_height;

    if text_width > 0 && text_height > 0 {
      let rect = Rect::at(x, label_y).of_size(text_width as u32, text_height as u32);
      draw_filled_rect_mut(image, rect, color);

      if let Some(font) = &self.font {
        draw_text_mut(
          image,
          Rgb([255u8, 255u8, 255u8]),
          x,
          label_y + LABEL_TEXT_VERTICAL_PADDING,
          self.font_scale,
          font,
          &label,
        );
      }
    }
  }

  /// 标签文本尺寸：有字体时实测，无字体时按字符宽度估算
  fn measure(&self, label: &str) -> (i32, i32) {
    match &self.font {
      Some(font) => {
        let (width, height) = text_size(self.font_scale, font, label);
        (
          width as i32,
          height as i32 + 2 * LABEL_TEXT_VERTICAL_PADDING,
        )
      }
      None => (
        (label.len() as f32 * LABEL_CHAR_WIDTH) as i32,
        LABEL_TEXT_HEIGHT,
      ),
    }
  }
}

/// 标签文本
///
/// 附带置信度时形如 `"person (87%)"`，否则只有类别名称。
pub fn label_text(detection: &Detection, show_confidence: bool) -> String {
  if show_confidence {
    format!(
      "{} ({}%)",
      detection.label,
      (detection.confidence * 100.0).round() as u32
    )
  } else {
    detection.label.clone()
  }
}
