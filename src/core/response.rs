//! 核心响应处理模块
//!
//! products 接口的 JSON 信封。业务失败（未插入、未命中）同样以 200 返回，
//! 只通过 `message` 区分。

use serde::{Deserialize, Serialize};

/// 业务结果标记，序列化为 `"success"` / `"error"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Message {
    Success,
    Error,
}

impl Message {
    pub fn from_flag(ok: bool) -> Self {
        if ok {
            Message::Success
        } else {
            Message::Error
        }
    }

    pub fn is_success(self) -> bool {
        self == Message::Success
    }
}

/// 写操作响应外层：`{ "response": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub response: T,
}

impl<T> Envelope<T> {
    pub fn new(response: T) -> Self {
        Self { response }
    }
}
