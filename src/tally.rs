// 该文件是 Guanlan （观澜） 项目的一部分。
// src/tally.rs - 按类别计数
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

use crate::detector::Detection;
use crate::vocab::ClassVocabulary;

/// 按类别的出现计数，覆盖词表内全部类别
///
/// 每周期从零重建；词表外的类别不计入任何条目。
#[derive(Debug)]
pub struct ClassTally {
  vocab: ClassVocabulary,
  counts: Vec<u32>,
}

impl ClassTally {
  /// 基于给定词表创建计数器，所有条目为 0
  pub fn new(vocab: ClassVocabulary) -> Self {
    let counts = vec![0; vocab.len()];
    Self { vocab, counts }
  }

  /// 以当前检测集从零重建计数
  pub fn rebuild(&mut self, detections: &[Detection]) {
    self.counts.fill(0);
    for detection in detections {
      // 词表外的类别静默忽略
      if let Some(index) = self.vocab.index_of(&detection.label) {
        self.counts[index] += 1;
      }
    }
  }

  /// 查询某类别的当前计数；词表外的类别返回 None
  pub fn count(&self, label: &str) -> Option<u32> {
    self.vocab.index_of(label).map(|index| self.counts[index])
  }

  /// 底层词表
  pub fn vocabulary(&self) -> &ClassVocabulary {
    &self.vocab
  }

  /// 按词表顺序遍历（类别, 计数）
  pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
    self.vocab.iter().zip(self.counts.iter().copied())
  }
}
