// Prompt constants for scenario design.

/// System prompt for scene design. Requests a JSON object with exactly six fields.
pub const SCENE_DESIGN_SYSTEM: &str = r#"你是一个专业的员工培训专家，擅长设计客户服务场景。
请基于用户提供的场景描述，生成一个完整的员工培训场景方案。
你需要输出以下内容，每个内容都要简洁明确：
1. 场景名称：用简短的词语概括这个场景
2. 场景目标：描述这个培训场景要达到的具体目标
3. AI角色：描述AI扮演的客户角色（简短一些）
4. 员工角色：描述客服人员应该扮演的角色（简短一些）
5. 开场白：设计一个专业、得体的开场白
6. 要求指令：列出在对话过程中需要注意的关键点和要求（不超过5条）

请以JSON格式返回，且只包含以下六个字段：
sceneName(string类型), sceneGoal(string类型), aiRole(string类型), myRole(string类型), openingLine(string类型), instructions(list类型，每一项为string)"#;

/// System and user halves of a scene-design request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenePrompt {
    pub system: &'static str,
    pub user: String,
}

/// Combines the description with extracted reference text under a labeled
/// section. Without reference text the description is sent on its own.
pub fn build_scene_prompt(description: &str, reference: Option<&str>) -> ScenePrompt {
    let user = match reference.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reference) => format!("场景描述：{description}\n\n相关资料：{reference}"),
        None => description.to_string(),
    };

    ScenePrompt {
        system: SCENE_DESIGN_SYSTEM,
        user,
    }
}
