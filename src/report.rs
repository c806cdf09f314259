//! Typed view of the JSON report the model returns

use serde::{Deserialize, Deserializer, Serialize};
use log::{debug, error};

/// Report fields requested by the prompt. Every field defaults when the
/// model leaves it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFields
{   #[serde(rename = "年度总结概述", default, deserialize_with = "text")]
    pub overview: String
  , #[serde(rename = "主要成就与贡献", default, deserialize_with = "items")]
    pub achievements: Vec<String>
  , #[serde(rename = "遇到的挑战及解决方案", default, deserialize_with = "items")]
    pub challenges: Vec<String>
  , #[serde(rename = "个人成长与学习", default, deserialize_with = "items")]
    pub growth: Vec<String>
  , #[serde(rename = "未来展望与计划", default, deserialize_with = "items")]
    pub future_plans: Vec<String>
  , #[serde(rename = "姓名", default, deserialize_with = "text")]
    pub name: String
  , #[serde(rename = "报告日期", default, deserialize_with = "text")]
    pub report_date: String
}

impl ReportFields
{   /// Parse the model's answer
    pub fn parse(json_text: &str)
      -> Result<Self, crate::error::Error>
    {   let fields: ReportFields = serde_json::from_str(json_text)
          .map_err(|e| {
            error!("Model answer is not a report: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;
        debug!(
          "Parsed report: {} achievements, {} challenges, {} growth, {} plans",
          fields.achievements.len(),
          fields.challenges.len(),
          fields.growth.len(),
          fields.future_plans.len()
        );
        Ok(fields)
    }

    /// True when the model filled in nothing at all
    pub fn is_blank(&self) -> bool
    {   self.overview.trim().is_empty()
          && self.achievements.is_empty()
          && self.challenges.is_empty()
          && self.growth.is_empty()
          && self.future_plans.is_empty()
          && self.name.trim().is_empty()
          && self.report_date.trim().is_empty()
    }
}

/// List fields: accept an array or a lone string, drop blank items
fn items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where D: Deserializer<'de>
{   #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany
    {   One(String)
      , Many(Vec<String>)
      , Nothing(())
    }

    let raw = match OneOrMany::deserialize(deserializer)?
    {   OneOrMany::One(item) => vec![item]
      , OneOrMany::Many(items) => items
      , OneOrMany::Nothing(()) => vec![]
    };
    Ok(raw.into_iter()
      .map(|item| item.trim().to_string())
      .filter(|item| !item.is_empty())
      .collect())
}

/// Text fields: null reads as empty
fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de>
{   Ok(Option::<String>::deserialize(deserializer)?
      .map(|s| s.trim().to_string())
      .unwrap_or_default())
}
