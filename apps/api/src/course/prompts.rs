// Prompt construction for course generation and course adjustment.
// Both variants put everything in the system prompt; the user message is empty.

/// Scene fields the front end resends on every course request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseBrief {
    pub scene_description: String,
    pub scene_name: String,
    pub scene_goal: String,
    pub ai_role: String,
    pub my_role: String,
    pub opening_line: String,
    pub instructions: String,
    pub turn_count: u32,
}

/// Prior course text plus the user's free-text change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseAdjustment {
    pub previous_content: String,
    pub instruction: String,
}

const COURSE_PREAMBLE: &str = "你是一个专业的培训对话生成专家。";

/// Builds the system prompt for a new course or, with `adjustment`, a revision
/// of an existing one. Pure function of its arguments.
pub fn build_course_prompt(
    brief: &CourseBrief,
    reference: Option<&str>,
    adjustment: Option<&CourseAdjustment>,
) -> String {
    let turns = brief.turn_count;
    let employee = &brief.my_role;
    let ai = &brief.ai_role;
    let reference = reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("无");

    let task = match adjustment {
        Some(_) => format!("请基于以下信息，按照调整要求修改已有的{turns}轮培训对话："),
        None => format!("请基于以下信息生成一个{turns}轮的培训对话："),
    };

    let mut prompt = format!(
        "{COURSE_PREAMBLE}{task}

场景描述：{description}
场景名称：{name}
场景目标：{goal}
AI角色：{ai}
员工角色：{employee}
开场白：{opening}
指令要求：{instructions}

参考资料：{reference}
",
        description = brief.scene_description,
        name = brief.scene_name,
        goal = brief.scene_goal,
        opening = brief.opening_line,
        instructions = brief.instructions,
    );

    if let Some(adjustment) = adjustment {
        prompt.push_str(&format!(
            "
已有对话内容：
{previous}

调整要求：{instruction}
请在保留合理部分的基础上按调整要求修改，并输出修改后的完整对话。
",
            previous = adjustment.previous_content.trim(),
            instruction = adjustment.instruction.trim(),
        ));
    }

    prompt.push_str(&format!(
        "
请生成{turns}轮对话，要求：
1. 对话要符合场景描述和目标
2. AI扮演{ai}角色
3. 员工扮演{employee}角色
4. 第一句话必须是员工说的开场白
5. 整个对话必须严格遵守指令要求
6. 对话要自然流畅，符合真实场景
7. 必须是员工和AI轮流发言，不允许员工或AI连续说两轮
8. 推理过程不要太啰嗦

请输出对话内容，每一句都要标明是谁在说话，每行一句，格式如下：
{employee}: 第一句话
{ai}: 第二句话
{employee}: 第三句话
{ai}: 第四句话
...
"
    ));

    prompt
}
