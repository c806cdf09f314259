//! Instruction text sent to the model

/// Assistant-role instruction sent as the system turn
pub const SYSTEM_INSTRUCTION: &str = concat!(
  "你是一个专业的企业年度总结报告智能助手。",
  "你的任务是根据用户提供的原始工作内容，",
  "提炼并总结出年度总结报告的关键信息，",
  "并以结构化的JSON格式输出。",
  "确保内容真实、简洁、客观。",
  "如果某个部分信息不足，请留空或简要说明。",
  "对于列表形式的字段，请输出JSON数组。"
);

const OPEN_MARK: char = '『';
const CLOSE_MARK: char = '』';

const HEADER: &str = "
请根据以下用户输入的文本内容，生成一份年度总结报告的关键信息。
如果某个字段没有对应内容，请使用空字符串或空列表。

用户输入内容：
";

const SCHEMA: &str = r#"

请严格按照以下JSON格式输出，确保字段名称不变：
{
  "年度总结概述": "根据上述内容，总结年度工作亮点、整体表现和主要成就，用一句话概括。",
  "主要成就与贡献": [
    "条目1：具体完成了什么，取得了什么成果",
    "条目2：...",
    "..."
  ],
  "遇到的挑战及解决方案": [
    "条目1：遇到了什么困难，如何解决的",
    "条目2：...",
    "..."
  ],
  "个人成长与学习": [
    "条目1：学习了什么新知识/技能，如何应用",
    "条目2：...",
    "..."
  ],
  "未来展望与计划": [
    "条目1：明年的主要工作目标",
    "条目2：...",
    "..."
  ],
  "姓名": "（请根据上下文推断或留空）",
  "报告日期": "（请根据上下文推断或填写当前日期，格式如：YYYY年MM月DD日）"
}
"#;

/// Wrap raw user text in the report instructions.
///
/// The text is embedded verbatim between `『` and `』`. When the text
/// already contains runs of either mark, both delimiters are widened to one
/// mark longer than the longest such run, and a space separates the
/// delimiter from text that starts or ends with a mark.
pub fn build(user_text: &str) -> String
{   let width = longest_mark_run(user_text) + 1;
    let open: String = std::iter::repeat(OPEN_MARK).take(width).collect();
    let close: String = std::iter::repeat(CLOSE_MARK).take(width).collect();

    let mut prompt = String::with_capacity(
      HEADER.len() + SCHEMA.len() + user_text.len() + 2 * width * 3 + 2
    );
    prompt.push_str(HEADER);
    prompt.push_str(&open);
    if user_text.starts_with(is_mark)
    {   prompt.push(' ');
    }
    prompt.push_str(user_text);
    if user_text.ends_with(is_mark)
    {   prompt.push(' ');
    }
    prompt.push_str(&close);
    prompt.push_str(SCHEMA);
    prompt
}

fn is_mark(c: char) -> bool
{   c == OPEN_MARK || c == CLOSE_MARK
}

fn longest_mark_run(text: &str) -> usize
{   let mut longest = 0;
    let mut current = 0;
    let mut current_mark = None;
    for c in text.chars()
    {   if c == OPEN_MARK || c == CLOSE_MARK
        {   current = if current_mark == Some(c) { current + 1 } else { 1 };
            current_mark = Some(c);
            longest = longest.max(current);
        } else
        {   current = 0;
            current_mark = None;
        }
    }
    longest
}
