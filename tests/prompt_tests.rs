use std::collections::HashMap;
use spark_summary::config::{Credentials, SummaryConfig};
use spark_summary::{prompt, strip_code_fence, Error, Protocol, ReportFields};

// ===== Prompt =====

#[test]
fn test_prompt_is_pure_and_embeds_text()
{   let text = "今年完成了三个项目";
    let a = prompt::build(text);
    let b = prompt::build(text);
    assert_eq!(a, b);
    assert!(a.contains("『今年完成了三个项目』"));
}

#[test]
fn test_prompt_lists_every_report_key()
{   let built = prompt::build("notes");
    for key in [
      "年度总结概述"
    , "主要成就与贡献"
    , "遇到的挑战及解决方案"
    , "个人成长与学习"
    , "未来展望与计划"
    , "姓名"
    , "报告日期"
    ]
    {   assert!(built.contains(&format!("\"{}\"", key)), "missing {}", key);
    }
}

#[test]
fn test_prompt_widens_delimiters_around_marks()
{   let text = "quote 『inner』 and 』』 run";
    let built = prompt::build(text);
    assert!(built.contains("『『『quote 『inner』 and 』』 run』』』"));
}

#[test]
fn test_prompt_pads_text_touching_a_delimiter()
{   let built = prompt::build("a』");
    assert!(built.contains("『『a』 』』"));

    let built = prompt::build("『b");
    assert!(built.contains("『『 『b』』"));
}

#[test]
fn test_system_instruction_asks_for_json()
{   assert!(prompt::SYSTEM_INSTRUCTION.contains("JSON"));
}

// ===== Fence stripping =====

#[test]
fn test_strip_json_fence()
{   assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
}

#[test]
fn test_strip_leaves_plain_text()
{   assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    assert_eq!(strip_code_fence("  {\"a\":1}\n"), "  {\"a\":1}\n");
}

#[test]
fn test_strip_surrounding_whitespace_and_bare_fence()
{   assert_eq!(strip_code_fence("\n  ```json\n{}\n```  \n"), "{}");
    assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
}

#[test]
fn test_strip_json_fence_with_content_on_first_line()
{   assert_eq!(
      strip_code_fence("```json{\"a\":1,\n\"b\":2}```"),
      "{\"a\":1,\n\"b\":2}"
    );
    assert_eq!(
      strip_code_fence("```json {\"a\":1}\n```"),
      "{\"a\":1}"
    );
}

#[test]
fn test_strip_other_language_tags()
{   // any single-word tag is accepted, not only `json`
    assert_eq!(strip_code_fence("```JSON5\n{}\n```"), "{}");
}

#[test]
fn test_strip_ignores_fence_inside_prose()
{   let text = "Here you go:\n```json\n{}\n```";
    assert_eq!(strip_code_fence(text), text);
    let text = "```json\n{}\n``` thanks";
    assert_eq!(strip_code_fence(text), text);
}

#[test]
fn test_strip_rejects_odd_tag_line()
{   let text = "```not a tag\n{}\n```";
    assert_eq!(strip_code_fence(text), text);
    let text = "```yaml: x\n{}\n```";
    assert_eq!(strip_code_fence(text), text);
}

// ===== Report =====

#[test]
fn test_report_parse()
{   let report = ReportFields::parse(r#"{
      "年度总结概述": "稳步推进",
      "主要成就与贡献": ["上线新系统", "  ", ""],
      "遇到的挑战及解决方案": "人手不足，通过外包解决",
      "个人成长与学习": [],
      "姓名": null
    }"#).unwrap();

    assert_eq!(report.overview, "稳步推进");
    assert_eq!(report.achievements, vec!["上线新系统".to_string()]);
    assert_eq!(report.challenges, vec!["人手不足，通过外包解决".to_string()]);
    assert!(report.growth.is_empty());
    assert!(report.future_plans.is_empty());
    assert_eq!(report.name, "");
    assert_eq!(report.report_date, "");
    assert!(!report.is_blank());
}

#[test]
fn test_report_blank_and_invalid()
{   assert!(ReportFields::parse("{}").unwrap().is_blank());
    assert!(matches!(
      ReportFields::parse("not json"),
      Err(Error::ParseError(_))
    ));
}

// ===== Config =====

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
{   let map: HashMap<String, String> = vars.iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_config_defaults()
{   let config = SummaryConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config.protocol, Protocol::Http);
    assert_eq!(config.http.base_url, "https://spark-api-open.xf-yun.com/v2");
    assert_eq!(config.http.model, "x1");
    assert_eq!(config.http.timeout_secs, 60);
    assert_eq!(
      config.streaming.endpoint(),
      "wss://spark-api.xf-yun.com/v3.5/chat"
    );
    assert_eq!(config.streaming.domain, "generalv3.5");
    assert_eq!(config.sampling.max_tokens, 4096);
    assert_eq!(config.sampling.top_k, 4);
}

#[test]
fn test_config_websocket_credentials()
{   let config = SummaryConfig::from_lookup(lookup(&[
      ("API_PROTOCOL", "websocket")
    , ("SPARK_APPID", "app")
    , ("SPARK_APIKEY", "key")
    , ("SPARK_APISECRET", "secret")
    , ("SPARK_HOST", "example.com")
    , ("SPARK_STREAM_TIMEOUT_SECS", "30")
    ])).unwrap();

    assert_eq!(config.protocol, Protocol::WebSocket);
    assert_eq!(config.streaming.host, "example.com");
    assert_eq!(config.streaming.timeout_secs, 30);
    assert_eq!(config.credentials().unwrap(), Credentials::Signed
    {   app_id: "app".to_string()
      , api_key: "key".to_string()
      , api_secret: "secret".to_string()
    });
}

#[test]
fn test_config_credentials_debug_is_redacted()
{   let credentials = Credentials::Bearer("top-secret".to_string());
    assert!(!format!("{:?}", credentials).contains("top-secret"));
}

#[test]
fn test_config_missing_credentials()
{   let config = SummaryConfig::from_lookup(lookup(&[
      ("API_PROTOCOL", "WEBSOCKET")
    , ("SPARK_APPID", "app")
    , ("SPARK_APIKEY", "   ")
    ])).unwrap();
    match config.credentials()
    {   Err(Error::Configuration(msg)) => assert!(msg.contains("SPARK_APIKEY"))
      , other => panic!("expected configuration error, got {:?}", other)
    }

    let config = SummaryConfig::from_lookup(lookup(&[])).unwrap();
    assert!(matches!(
      config.credentials(),
      Err(Error::Configuration(_))
    ));
}

#[test]
fn test_config_rejects_bad_values()
{   assert!(matches!(
      SummaryConfig::from_lookup(lookup(&[("API_PROTOCOL", "grpc")])),
      Err(Error::Configuration(_))
    ));
    assert!(matches!(
      SummaryConfig::from_lookup(lookup(&[("SPARK_HTTP_TIMEOUT_SECS", "0")])),
      Err(Error::Configuration(_))
    ));
}
