//! # Language & Brand Labels
//!
//! Two UI languages are supported. The language decides brand labels on cart
//! lines and the text written into exported order lists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Brand keys a cart line may be ordered under.
pub const BRAND_KEYS: [&str; 3] = ["no_brand", "kelon", "lixiong"];

/// UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::ZhCn => "zh-CN",
            Language::EnUs => "en-US",
        }
    }

    /// Display label for a brand key. Unknown keys display as themselves.
    pub fn brand_label<'a>(&self, key: &'a str) -> &'a str {
        match (self, key) {
            (Language::ZhCn, "no_brand") => "无品牌",
            (Language::ZhCn, "kelon") => "科龙",
            (Language::ZhCn, "lixiong") => "力雄",
            (Language::EnUs, "no_brand") => "No Brand",
            (Language::EnUs, "kelon") => "Kelon",
            (Language::EnUs, "lixiong") => "Lixiong",
            (_, other) => other,
        }
    }

    /// Text table for this language.
    pub fn text(&self) -> &'static Texts {
        match self {
            Language::ZhCn => &ZH_CN,
            Language::EnUs => &EN_US,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh-cn" | "zh" | "cn" => Ok(Language::ZhCn),
            "en-us" | "en" => Ok(Language::EnUs),
            _ => Err(ValidationError::NotAllowed {
                field: "language".to_string(),
                allowed: vec!["zh-CN".to_string(), "en-US".to_string()],
            }),
        }
    }
}

// =============================================================================
// Text Tables
// =============================================================================

/// Fixed UI and export strings for one language.
#[derive(Debug)]
pub struct Texts {
    pub no_products: &'static str,
    pub no_brand: &'static str,
    pub no_image: &'static str,
    pub order_list: &'static str,
    pub order_file_prefix: &'static str,
    pub col_serial: &'static str,
    pub col_image: &'static str,
    pub col_code: &'static str,
    pub col_original_code: &'static str,
    pub col_name: &'static str,
    pub col_specs: &'static str,
    pub col_brand: &'static str,
    pub col_quantity: &'static str,
    pub summary: &'static str,
    pub item_kinds: &'static str,
    pub total_quantity: &'static str,
    pub export_date: &'static str,
    pub export_time: &'static str,
}

static ZH_CN: Texts = Texts {
    no_products: "暂无商品",
    no_brand: "无品牌",
    no_image: "无图片",
    order_list: "订购清单",
    order_file_prefix: "订购清单",
    col_serial: "序号",
    col_image: "图片",
    col_code: "商品编码",
    col_original_code: "原始编码",
    col_name: "商品名称",
    col_specs: "规格说明",
    col_brand: "品牌",
    col_quantity: "数量",
    summary: "汇总信息",
    item_kinds: "商品种类",
    total_quantity: "总数量",
    export_date: "导出日期",
    export_time: "导出时间",
};

static EN_US: Texts = Texts {
    no_products: "No products",
    no_brand: "No Brand",
    no_image: "No image",
    order_list: "Order List",
    order_file_prefix: "Order_List",
    col_serial: "No.",
    col_image: "Image",
    col_code: "Code",
    col_original_code: "Original Code",
    col_name: "Name",
    col_specs: "Specs",
    col_brand: "Brand",
    col_quantity: "Quantity",
    summary: "Summary",
    item_kinds: "Item kinds",
    total_quantity: "Total quantity",
    export_date: "Export date",
    export_time: "Export time",
};
