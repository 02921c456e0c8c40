//! Stage catalog
//!
//! An ordered, validated list of stage definitions. The first stage receives
//! the idea text; the last stage is the synthesis stage and receives every
//! earlier result.

use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

use crate::agents::AgentPersona;
use crate::templates::check_template;

/// Stage keys of the default catalog. Extraction looks results up by these.
pub mod stage_keys {
    pub const PRODUCT_IDEA_STRUCTURING: &str = "product_idea_structuring";
    pub const MARKET_RESEARCH: &str = "market_research";
    pub const COMPETITIVE_ANALYSIS: &str = "competitive_analysis";
    pub const SWOT_ANALYSIS: &str = "swot_analysis";
    pub const FINANCIAL_PROJECTIONS: &str = "financial_projections";
    pub const TECHNICAL_FEASIBILITY: &str = "technical_feasibility";
    pub const CUSTOMER_SEGMENTATION: &str = "customer_segmentation";
    pub const MARKETING_STRATEGY: &str = "marketing_strategy";
    pub const KPI_DEFINITION: &str = "kpi_definition";
    pub const REPORT_SYNTHESIS: &str = "report_synthesis";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Stage catalog is empty")]
    Empty,

    #[error("Stage at position {0} has a blank name")]
    BlankName(usize),

    #[error("Duplicate stage name '{0}'")]
    DuplicateName(String),

    #[error("Invalid prompt template for stage '{stage}': {message}")]
    InvalidTemplate { stage: String, message: String },
}

/// One stage of the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct StageDefinition {
    /// Unique key; also the key of the stage's result
    pub name: String,
    /// Display title, used in error sentinels and report headings
    pub title: String,
    pub persona: AgentPersona,
    /// Tera template for the prompt
    pub description_template: String,
    pub expected_output: String,
}

impl StageDefinition {
    pub fn new(
        name: &str,
        title: &str,
        persona: AgentPersona,
        description_template: &str,
        expected_output: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            persona,
            description_template: description_template.to_string(),
            expected_output: expected_output.to_string(),
        }
    }
}

/// Validated, ordered stage list
#[derive(Debug, Clone)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
}

impl StageCatalog {
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, CatalogError> {
        if stages.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, stage) in stages.iter().enumerate() {
            if stage.name.trim().is_empty() {
                return Err(CatalogError::BlankName(index));
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(CatalogError::DuplicateName(stage.name.clone()));
            }
            check_template(&stage.name, &stage.description_template).map_err(|e| {
                CatalogError::InvalidTemplate {
                    stage: stage.name.clone(),
                    message: e.to_string(),
                }
            })?;
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn first(&self) -> &StageDefinition {
        &self.stages[0]
    }

    /// The terminal stage
    pub fn synthesis(&self) -> &StageDefinition {
        &self.stages[self.stages.len() - 1]
    }

    /// The terminal stage and the analysis stages before it
    pub fn split_synthesis(&self) -> (&StageDefinition, &[StageDefinition]) {
        let (analysis, terminal) = self.stages.split_at(self.stages.len() - 1);
        (&terminal[0], analysis)
    }

    pub fn get(&self, name: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.name == name)
    }
}

/// The ten-stage product analysis catalog
pub fn default_catalog() -> StageCatalog {
    use stage_keys::*;

    let stages = vec![
        StageDefinition::new(
            PRODUCT_IDEA_STRUCTURING,
            "Product Idea Structuring",
            AgentPersona::new(
                "Product Idea Intake Specialist",
                "Structure and validate incoming product ideas into a standardized format",
                "You are a product intake specialist who excels at organizing raw product ideas \
                 into structured, actionable formats. You make sure every necessary detail is \
                 captured and categorized for downstream analysis.",
            ),
            r#"Structure and validate the following product idea into a standardized format:

Product Idea: "{{ idea }}"

Organize this idea into:
1. Product name and description
2. Core problem statement
3. Proposed solution
4. Initial target audience
5. Unique value proposition
6. Key assumptions to validate"#,
            "A structured product idea document with clearly defined sections:\n\
             - Product Overview\n- Problem Statement\n- Solution Description\n\
             - Target Audience\n- Value Proposition\n- Key Assumptions",
        ),
        StageDefinition::new(
            MARKET_RESEARCH,
            "Market Research",
            AgentPersona::new(
                "Market Research Analyst",
                "Conduct comprehensive market research and identify market opportunities",
                "You are an experienced market research analyst who identifies market trends, \
                 sizes opportunities and explains industry dynamics with data-driven insight.",
            ),
            r#"Conduct comprehensive market research for the product idea.

Research areas:
1. Market size and growth potential (state TAM, SAM and SOM in dollars)
2. Industry trends and dynamics
3. Regulatory considerations
4. Market entry barriers
5. Distribution channels
6. Pricing benchmarks"#,
            "A detailed market research report including:\n\
             - Total Addressable Market (TAM) analysis\n- Market trends and growth projections\n\
             - Industry landscape overview\n- Regulatory and compliance requirements\n\
             - Go-to-market channel analysis\n- Pricing strategy recommendations",
        ),
        StageDefinition::new(
            COMPETITIVE_ANALYSIS,
            "Competitive Analysis",
            AgentPersona::new(
                "Competitive Intelligence Analyst",
                "Analyze the competitive landscape and identify differentiation opportunities",
                "You are a competitive intelligence expert who analyzes competitors, finds gaps \
                 in the market and spots strategic positioning opportunities.",
            ),
            r#"Perform a comprehensive competitive analysis.

Analysis focus:
1. Direct and indirect competitors (name each one with its market share)
2. Competitor strengths and weaknesses
3. Market positioning analysis
4. Feature comparison matrix
5. Pricing strategy analysis
6. Differentiation opportunities"#,
            "A comprehensive competitive analysis report containing:\n\
             - Competitor landscape map\n- Detailed competitor profiles\n\
             - Feature comparison matrix\n- Competitive positioning analysis\n\
             - Differentiation opportunities\n- Competitive threats assessment",
        ),
        StageDefinition::new(
            SWOT_ANALYSIS,
            "SWOT Analysis",
            AgentPersona::new(
                "Strategic Business Analyst",
                "Perform SWOT analysis and strategic planning",
                "You are a strategic business analyst with deep expertise in business strategy \
                 and SWOT analysis, guiding decisions with a clear view of internal and external \
                 factors.",
            ),
            r#"Conduct a comprehensive SWOT analysis for the product.

Analyze, using a heading and bullet list for each quadrant:
1. Strengths - what advantages does this product have?
2. Weaknesses - what areas need improvement?
3. Opportunities - what market opportunities exist?
4. Threats - what challenges could impact success?
5. Strategic implications and recommendations"#,
            "A detailed SWOT analysis report with:\n\
             - Strengths analysis with supporting evidence\n\
             - Weaknesses identification and mitigation strategies\n\
             - Market opportunities assessment\n- Threats analysis and risk mitigation\n\
             - Strategic recommendations based on SWOT findings",
        ),
        StageDefinition::new(
            FINANCIAL_PROJECTIONS,
            "Financial Projections",
            AgentPersona::new(
                "Financial Projections Analyst",
                "Create detailed financial projections and business models",
                "You are a financial analyst specializing in startup financial modeling. You \
                 build revenue models and cost structures to judge viability and investment \
                 needs.",
            ),
            r#"Develop financial projections and a business model analysis.

Create projections for:
1. Revenue model and streams (state first-year revenue in dollars)
2. Cost structure analysis (state first-year costs in dollars)
3. 3-year financial projections
4. Break-even analysis (state the break-even month)
5. Funding requirements
6. ROI and profitability analysis"#,
            "A comprehensive financial analysis including:\n\
             - Revenue model definition\n- Detailed cost structure breakdown\n\
             - 3-year P&L projections\n- Cash flow analysis\n- Break-even analysis\n\
             - Investment requirements and ROI projections",
        ),
        StageDefinition::new(
            TECHNICAL_FEASIBILITY,
            "Technical Feasibility",
            AgentPersona::new(
                "Technical Feasibility Assessor",
                "Evaluate technical requirements and implementation feasibility",
                "You are a senior technical architect who assesses technology requirements, \
                 development complexity, scalability concerns and implementation roadmaps.",
            ),
            r#"Assess the technical feasibility of building the product.

Evaluate:
1. Technology stack requirements
2. Development complexity (score it out of 10)
3. Scalability considerations
4. Security and compliance requirements
5. Integration challenges
6. Implementation timeline as a list of phases with durations"#,
            "A technical feasibility report containing:\n\
             - Technology architecture recommendations\n- Development complexity analysis\n\
             - Scalability and performance considerations\n\
             - Security and compliance requirements\n- Technical risk assessment\n\
             - Development roadmap and timeline",
        ),
        StageDefinition::new(
            CUSTOMER_SEGMENTATION,
            "Customer Segmentation",
            AgentPersona::new(
                "Customer Insights Analyst",
                "Analyze customer segments and develop user personas",
                "You are a customer insights specialist who understands user behavior, builds \
                 customer segments and writes personas grounded in real needs.",
            ),
            r#"Develop customer segmentation and user personas.

Create:
1. Customer segments with their share of the customer base in percent
2. Age distribution of the target audience in percent
3. Detailed user personas
4. Customer journey and conversion funnel
5. Needs and pain points analysis
6. Customer acquisition strategies"#,
            "A comprehensive customer insights report with:\n\
             - Customer segmentation matrix\n\
             - Detailed user personas with demographics and psychographics\n\
             - Customer journey maps\n- Pain points and needs analysis\n\
             - Behavioral insights and preferences\n- Customer acquisition recommendations",
        ),
        StageDefinition::new(
            MARKETING_STRATEGY,
            "Marketing Strategy",
            AgentPersona::new(
                "Marketing Strategy Specialist",
                "Develop comprehensive go-to-market strategies",
                "You are a marketing strategist who builds go-to-market plans, positioning and \
                 messaging, and optimizes the marketing channel mix.",
            ),
            r#"Develop a go-to-market and marketing strategy.

Develop:
1. Brand positioning and messaging
2. Marketing channel strategy
3. Content marketing approach
4. Launch strategy and timeline
5. Customer acquisition tactics
6. Marketing budget (total in dollars and percent per channel)"#,
            "A comprehensive marketing strategy document including:\n\
             - Brand positioning and value proposition\n\
             - Messaging framework and key messages\n\
             - Marketing channel mix and strategy\n- Go-to-market launch plan\n\
             - Customer acquisition funnel and tactics\n\
             - Marketing budget allocation and ROI expectations",
        ),
        StageDefinition::new(
            KPI_DEFINITION,
            "KPI Definition",
            AgentPersona::new(
                "KPI Metrics Definition Specialist",
                "Define key performance indicators and success metrics",
                "You are a metrics and analytics expert who defines meaningful KPIs and the \
                 measurement frameworks that track product and business outcomes.",
            ),
            r#"Define the key performance indicators and success metrics framework.

Establish, with a current baseline and a target for each:
1. Revenue
2. Active users
3. Conversion rate
4. Retention rate
5. Customer satisfaction (out of 5)
6. Churn rate"#,
            "A comprehensive KPI framework document with:\n\
             - Business KPIs with targets and benchmarks\n\
             - Product metrics and analytics requirements\n\
             - Customer success and satisfaction metrics\n\
             - Financial performance indicators\n\
             - Operational metrics and efficiency measures\n\
             - Measurement methodology and reporting cadence",
        ),
        StageDefinition::new(
            REPORT_SYNTHESIS,
            "Report Synthesis",
            AgentPersona::new(
                "Strategic Report Synthesizer",
                "Synthesize all analyses into comprehensive strategic reports",
                "You are a senior business consultant who turns analyses from many sources \
                 into clear executive-level reports that drive decisions.",
            ),
            r#"Synthesize all previous analyses into a comprehensive strategic report.
{% for stage in prior_stages %}
{{ stage.title }}:
{{ stage.text }}
{% endfor %}
Compile and synthesize:
1. Executive summary with key findings
2. Strategic recommendations
3. Implementation roadmap
4. Risk analysis and mitigation
5. Success factors and critical dependencies
6. Next steps and action items"#,
            "A comprehensive strategic report including:\n\
             - Executive Summary with key insights\n\
             - Strategic recommendations and rationale\n\
             - Detailed implementation roadmap\n\
             - Risk assessment and mitigation strategies\n- Critical success factors\n\
             - Prioritized action plan and next steps",
        ),
    ];

    StageCatalog { stages }
}
