// 该文件是 Guanlan （观澜） 项目的一部分。
// src/vocab.rs - 固定类别词表
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

use std::collections::HashMap;

/// COCO 数据集类别名称
pub const COCO_CLASSES: [&str; 80] = [
  "person",
  "bicycle",
  "car",
  "motorcycle",
  "airplane",
  "bus",
  "train",
  "truck",
  "boat",
  "traffic light",
  "fire hydrant",
  "stop sign",
  "parking meter",
  "bench",
  "bird",
  "cat",
  "dog",
  "horse",
  "sheep",
  "cow",
  "elephant",
  "bear",
  "zebra",
  "giraffe",
  "backpack",
  "umbrella",
  "handbag",
  "tie",
  "suitcase",
  "frisbee",
  "skis",
  "snowboard",
  "sports ball",
  "kite",
  "baseball bat",
  "baseball glove",
  "skateboard",
  "surfboard",
  "tennis racket",
  "bottle",
  "wine glass",
  "cup",
  "fork",
  "knife",
  "spoon",
  "bowl",
  "banana",
  "apple",
  "sandwich",
  "orange",
  "broccoli",
  "carrot",
  "hot dog",
  "pizza",
  "donut",
  "cake",
  "chair",
  "couch",
  "potted plant",
  "bed",
  "dining table",
  "toilet",
  "tv",
  "laptop",
  "mouse",
  "remote",
  "keyboard",
  "cell phone",
  "microwave",
  "oven",
  "toaster",
  "sink",
  "refrigerator",
  "book",
  "clock",
  "vase",
  "scissors",
  "teddy bear",
  "hair drier",
  "toothbrush",
];

/// 固定有序类别词表，进程生命周期内不可变
#[derive(Debug, Clone)]
pub struct ClassVocabulary {
  /// 有序类别名称
  labels: Vec<String>,
  /// 名称到序号的反查表
  index: HashMap<String, usize>,
}

impl ClassVocabulary {
  /// 从有序名称列表创建词表，重复名称保留首次出现的序号
  pub fn new<I, S>(labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut ordered = Vec::new();
    let mut index = HashMap::new();

    for label in labels {
      let label = label.into();
      if !index.contains_key(&label) {
        index.insert(label.clone(), ordered.len());
        ordered.push(label);
      }
    }

    Self {
      labels: ordered,
      index,
    }
  }

  /// COCO 80 类词表
  pub fn coco() -> Self {
    Self::new(COCO_CLASSES)
  }

  /// 类别数量
  pub fn len(&self) -> usize {
    self.labels.len()
  }

  /// 词表是否为空
  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  /// 按序号取类别名称
  pub fn label(&self, index: usize) -> Option<&str> {
    self.labels.get(index).map(String::as_str)
  }

  /// 按名称查序号
  pub fn index_of(&self, label: &str) -> Option<usize> {
    self.index.get(label).copied()
  }

  /// 名称是否在词表内
  pub fn contains(&self, label: &str) -> bool {
    self.index.contains_key(label)
  }

  /// 按词表顺序遍历类别名称
  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str)
  }
}
