//! Embedded prompt templates
//!
//! Compiled into the library; the compiler registers them once at
//! construction. All four templates pin the output language: downstream
//! parsing and report assembly assume monolingual output.

/// Round 1: foundations - goals, audience, challenges, benefits, constraints
pub const ROUND1: &str = r#"You are helping refine a product idea through structured questioning.

The idea:
{{idea}}

Produce exactly 5 assertive statements about this idea that the user will rate on a 1-5 agreement scale. The statements must cover, one each: the idea's goals, its audience, its challenges, its benefits, and its constraints.

For each statement, supply a tailored set of 5 scale labels describing what positions 1 through 5 mean for that specific statement.

Output requirements:
- Respond with ONLY a JSON object, no prose before or after.
- Shape: {"questions": [{"text": "<statement>", "scaleLabels": ["<1>", "<2>", "<3>", "<4>", "<5>"]}]}
- Exactly 5 entries. Each scaleLabels array must have exactly 5 non-empty labels.
- Write every statement and every label in {{language}}. This is a hard requirement.
"#;

/// Round 2: execution - implementation, risks, resources, competition, timeline
pub const ROUND2: &str = r#"You are helping refine a product idea through structured questioning. The user has already rated a first round of statements.

The idea:
{{idea}}

Round 1 answers:
{{#each round1}}
- Statement: {{question}}
  Answer: {{label}} ({{scale}}/5)
{{/each}}

Produce exactly 5 assertive statements that build on these answers. The statements must cover, one each: implementation approach, risks, required resources, competition, and timeline.

For each statement, supply a tailored set of 5 scale labels describing what positions 1 through 5 mean for that specific statement.

Output requirements:
- Respond with ONLY a JSON object, no prose before or after.
- Shape: {"questions": [{"text": "<statement>", "scaleLabels": ["<1>", "<2>", "<3>", "<4>", "<5>"]}]}
- Exactly 5 entries. Each scaleLabels array must have exactly 5 non-empty labels.
- Write every statement and every label in {{language}}. This is a hard requirement.
"#;

/// Round 3: focus items, prioritized later on a fixed MoSCoW scale
pub const ROUND3: &str = r#"You are helping refine a product idea. The user has rated two rounds of statements and now wants concrete items to prioritize.

The idea:
{{idea}}

Round 1 answers:
{{#each round1}}
- Statement: {{question}}
  Answer: {{label}} ({{scale}}/5)
{{/each}}

Round 2 answers:
{{#each round2}}
- Statement: {{question}}
  Answer: {{label}} ({{scale}}/5)
{{/each}}

Focus: {{focus_instruction}}

Produce exactly 5 concise items matching that focus. The user will prioritize them on a Must/Should/Could/Nice-to-have/N/A scale, so do not supply scale labels.

Output requirements:
- Respond with ONLY a JSON object, no prose before or after.
- Shape: {"questions": ["<item>", "<item>", "<item>", "<item>", "<item>"]}
- Exactly 5 entries, plain strings only.
- Write every item in {{language}}. This is a hard requirement.
"#;

/// Final plan: nine named sections in fixed order
pub const PLAN: &str = r#"You are writing a long-form plan for a product idea the user has refined through three rounds of structured questioning.

The idea:
{{idea}}

Round 1 answers (foundations):
{{#each round1}}
- Statement: {{question}}
  Answer: {{label}} ({{scale}}/5)
{{/each}}

Round 2 answers (execution):
{{#each round2}}
- Statement: {{question}}
  Answer: {{label}} ({{scale}}/5)
{{/each}}

Round 3 priorities:
{{#each round3}}
- Item: {{question}}
  Priority: {{label}} ({{scale}}/5)
{{/each}}

Write a complete plan with exactly these nine sections, in this order:

1. Overview
2. Analysis of Answered Questions
3. Market Position & Feasibility
4. Objectives
5. Implementation Steps
6. Risks & Mitigations
7. Required Resources
8. Competitive Landscape
9. Timeline

Section 2 must synthesize all 15 accumulated answers above into a narrative: what the answers reveal about the idea's direction, strengths, and open concerns. Ground sections 3 through 9 in standard feasibility and market-analysis dimensions (demand, differentiation, cost structure, execution capacity).

Write the entire plan in {{language}}. This is a hard requirement.
"#;
