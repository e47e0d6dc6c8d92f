//! Workflow prompts: parameterized multi-step instructions that walk a
//! client through common firm workflows using the tool catalog.
//!
//! Each builder returns the prompt body as lines; rendering joins them
//! into a single user message.

use rmcp::ErrorData as McpError;
use rmcp::model::{
    GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
};
use serde_json::{Map, Value};

fn arg(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(required),
    }
}

/// The full prompt catalog, in listing order.
pub fn definitions() -> Vec<Prompt> {
    vec![
        Prompt::new(
            "find-contact-by-phone",
            Some("Find all contacts and matters associated with a phone number"),
            Some(vec![arg("phone_number", "The phone number to search for", true)]),
        ),
        Prompt::new(
            "matter-overview",
            Some("Get comprehensive overview of a matter including all associated data"),
            Some(vec![arg("matter_id", "The matter ID to analyze", true)]),
        ),
        Prompt::new(
            "create-new-client",
            Some("Workflow for creating a new client with complete information"),
            Some(vec![
                arg("first_name", "Client's first name", true),
                arg("last_name", "Client's last name", true),
                arg("email", "Client's email address", true),
                arg("phone", "Client's phone number", true),
            ]),
        ),
        Prompt::new(
            "daily-task-summary",
            Some("Get summary of today's tasks and upcoming deadlines"),
            Some(vec![arg("user_id", "User ID to get tasks for", false)]),
        ),
        Prompt::new(
            "billing-report",
            Some("Generate billing report for a matter or client"),
            Some(vec![
                arg("matter_id", "Matter ID for billing report", false),
                arg("contact_id", "Contact ID for billing report", false),
                arg("start_date", "Start date (YYYY-MM-DD)", false),
                arg("end_date", "End date (YYYY-MM-DD)", false),
            ]),
        ),
        Prompt::new(
            "matter-search-analysis",
            Some("Search for matters by criteria and provide analysis"),
            Some(vec![
                arg("practice_area", "Practice area to filter by", false),
                arg("status", "Matter status to filter by", false),
            ]),
        ),
    ]
}

/// Render a prompt by name. Returns `None` for unknown names so the
/// caller can produce the protocol-level error.
pub fn render(name: &str, arguments: Option<&Map<String, Value>>) -> Option<GetPromptResult> {
    let get = |key: &str| -> String {
        arguments
            .and_then(|a| a.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let lines = match name {
        "find-contact-by-phone" => find_contact_by_phone(&get("phone_number")),
        "matter-overview" => matter_overview(&get("matter_id")),
        "create-new-client" => create_new_client(
            &get("first_name"),
            &get("last_name"),
            &get("email"),
            &get("phone"),
        ),
        "daily-task-summary" => daily_task_summary(&get("user_id")),
        "billing-report" => billing_report(
            &get("matter_id"),
            &get("contact_id"),
            &get("start_date"),
            &get("end_date"),
        ),
        "matter-search-analysis" => matter_search_analysis(&get("practice_area"), &get("status")),
        _ => return None,
    };

    let description = definitions()
        .into_iter()
        .find(|p| p.name == name)
        .and_then(|p| p.description);
    Some(GetPromptResult {
        description,
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            lines.join("\n"),
        )],
    })
}

/// Protocol error for a prompt name not in the catalog.
pub fn unknown_prompt(name: &str) -> McpError {
    McpError::invalid_params(format!("Unknown prompt: {name}"), None)
}

pub fn find_contact_by_phone(phone_number: &str) -> Vec<String> {
    vec![
        format!("I need to find all contacts and matters associated with phone number: {phone_number}"),
        String::new(),
        "Please follow these steps:".to_string(),
        format!("1. Use 'search_contacts' tool with phone: '{phone_number}' to find matching contacts"),
        "2. For each contact found:".to_string(),
        "   - Display the contact's full name, email, and current status".to_string(),
        "   - Note any associated company or organization".to_string(),
        "3. If contacts are found, use their contact IDs to search for associated matters:".to_string(),
        "   - For each contact, use 'search_matters' with the contact_id parameter".to_string(),
        "   - List all matters with their status and practice area".to_string(),
        "4. Provide a summary of:".to_string(),
        "   - Total contacts found with this phone number".to_string(),
        "   - Total matters associated with these contacts".to_string(),
        "   - Current status of each matter (active, closed, etc.)".to_string(),
    ]
}

pub fn matter_overview(matter_id: &str) -> Vec<String> {
    vec![
        format!("I need a comprehensive overview of matter ID: {matter_id}"),
        String::new(),
        "STEP 1: Matter Details".to_string(),
        "  - Use 'get_matter' tool to retrieve full matter information".to_string(),
        "  - Extract: matter name, status, practice area, dates, and description".to_string(),
        String::new(),
        "STEP 2: Associated Contacts".to_string(),
        format!("  - Use 'search_contacts' with matter_id: '{matter_id}' to find all related contacts"),
        "  - List primary contact(s), their role, and contact information".to_string(),
        String::new(),
        "STEP 3: Active Tasks".to_string(),
        format!("  - Use 'search_tasks' with matter_id: '{matter_id}' to find all tasks"),
        "  - Categorize by status (pending vs. completed)".to_string(),
        "  - Identify overdue tasks if any".to_string(),
        "  - List upcoming tasks with due dates".to_string(),
        String::new(),
        "STEP 4: Time & Billing".to_string(),
        format!("  - Use 'search_time_entries' with matter_id: '{matter_id}' to get billable hours"),
        format!("  - Use 'search_expenses' with matter_id: '{matter_id}' to get expenses"),
        "  - Calculate total hours logged and total expenses".to_string(),
        String::new(),
        "STEP 5: Summary".to_string(),
        "  - Provide executive summary with key statistics".to_string(),
        "  - Flag any issues (overdue tasks, pending items)".to_string(),
        "  - Recommend next actions if applicable".to_string(),
    ]
}

pub fn create_new_client(
    first_name: &str,
    last_name: &str,
    email: &str,
    phone: &str,
) -> Vec<String> {
    vec![
        format!("I need to create a new client: {first_name} {last_name}"),
        format!("Email: {email}"),
        format!("Phone: {phone}"),
        String::new(),
        "STEP 1: Check for Existing Contact".to_string(),
        format!("  - Use 'search_contacts' with email: '{email}' and phone: '{phone}'"),
        "  - If contact exists, ask if update is needed instead".to_string(),
        String::new(),
        "STEP 2: Create Contact".to_string(),
        "  - Use 'create_contact' tool with the following:".to_string(),
        format!("    - first_name: '{first_name}'"),
        format!("    - last_name: '{last_name}'"),
        format!("    - email: '{email}'"),
        format!("    - phone: '{phone}'"),
        "    - contact_type: 'client'".to_string(),
        "  - Capture the returned contact_id".to_string(),
        String::new(),
        "STEP 3: Confirm Creation".to_string(),
        "  - Use 'get_contact' with the new contact_id to verify".to_string(),
        "  - Display the complete contact record".to_string(),
        String::new(),
        "STEP 4: Ask About Next Steps".to_string(),
        "  - Does this client need a matter/case created?".to_string(),
        "  - Should any tasks be created for follow-up?".to_string(),
    ]
}

pub fn daily_task_summary(user_id: &str) -> Vec<String> {
    let user_filter = if user_id.is_empty() {
        " for all users".to_string()
    } else {
        format!(" for user {user_id}")
    };
    let mut lines = vec![
        format!("I need a daily task summary{user_filter}"),
        String::new(),
        "STEP 1: Today's Tasks".to_string(),
        "  - Use 'search_tasks' with due_date_before set to today".to_string(),
    ];
    if !user_id.is_empty() {
        lines.push(format!("  - Filter by assigned_to: '{user_id}'"));
    }
    lines.extend([
        "  - Group by status (pending, completed)".to_string(),
        String::new(),
        "STEP 2: Overdue Tasks".to_string(),
        "  - Use 'search_tasks' with due_date_before set to yesterday".to_string(),
        "  - Filter for status: 'pending'".to_string(),
        "  - These are critical overdue items".to_string(),
        String::new(),
        "STEP 3: Upcoming This Week".to_string(),
        "  - Use 'search_tasks' with due_date_before set to 7 days from now".to_string(),
        "  - Focus on pending tasks".to_string(),
        String::new(),
        "STEP 4: Summary Report".to_string(),
        "  - Total overdue tasks (with count)".to_string(),
        "  - Total tasks due today".to_string(),
        "  - Total tasks due this week".to_string(),
        "  - Group by matter/contact if applicable".to_string(),
        "  - Provide prioritized action list".to_string(),
    ]);
    lines
}

pub fn billing_report(
    matter_id: &str,
    contact_id: &str,
    start_date: &str,
    end_date: &str,
) -> Vec<String> {
    if matter_id.is_empty() && contact_id.is_empty() {
        return vec![
            "Error: Must provide either matter_id or contact_id for billing report".to_string(),
        ];
    }

    let filter_desc = if matter_id.is_empty() {
        format!("contact {contact_id}")
    } else {
        format!("matter {matter_id}")
    };
    let date_range = if !start_date.is_empty() && !end_date.is_empty() {
        format!(" from {start_date} to {end_date}")
    } else {
        String::new()
    };

    vec![
        format!("I need a billing report for {filter_desc}{date_range}"),
        String::new(),
        "STEP 1: Retrieve Time Entries".to_string(),
        format!("  - Use 'search_time_entries' filtered by {filter_desc}"),
        "  - Add date filters if provided".to_string(),
        "  - Calculate total billable hours".to_string(),
        "  - Group by user/attorney".to_string(),
        String::new(),
        "STEP 2: Retrieve Expenses".to_string(),
        format!("  - Use 'search_expenses' filtered by {filter_desc}"),
        "  - Add date filters if provided".to_string(),
        "  - Calculate total billable expenses".to_string(),
        "  - Group by category".to_string(),
        String::new(),
        "STEP 3: Get Matter/Contact Details".to_string(),
        "  - Use appropriate get tool for context".to_string(),
        "  - Include client name, matter name/description".to_string(),
        String::new(),
        "STEP 4: Generate Report".to_string(),
        "  - Create formatted billing summary with:".to_string(),
        "    - Client/Matter information".to_string(),
        "    - Time entries table (date, user, hours, description)".to_string(),
        "    - Expenses table (date, category, amount, description)".to_string(),
        "    - Subtotals by attorney/category".to_string(),
        "    - Grand total (time + expenses)".to_string(),
        "  - Note: rates may need to be added manually from firm settings".to_string(),
    ]
}

pub fn matter_search_analysis(practice_area: &str, status: &str) -> Vec<String> {
    let area = if practice_area.is_empty() {
        String::new()
    } else {
        format!(" in practice area: {practice_area}")
    };
    let status_part = if status.is_empty() {
        String::new()
    } else {
        format!(" with status: {status}")
    };

    vec![
        format!("I need to search and analyze matters{area}{status_part}"),
        String::new(),
        "STEP 1: Search Matters".to_string(),
        "  - Use 'search_matters' with specified filters".to_string(),
        "  - Set appropriate limit (suggest 50 for analysis)".to_string(),
        String::new(),
        "STEP 2: Basic Analysis".to_string(),
        "  - Count total matters found".to_string(),
        "  - Breakdown by status if not filtered".to_string(),
        "  - Breakdown by practice area if not filtered".to_string(),
        String::new(),
        "STEP 3: Activity Analysis".to_string(),
        "  - For each matter, check for recent activity:".to_string(),
        "    - Use 'search_tasks' to count pending tasks".to_string(),
        "    - Use 'search_time_entries' to check recent billing".to_string(),
        "  - Identify stagnant matters (no recent activity)".to_string(),
        String::new(),
        "STEP 4: Summary Report".to_string(),
        "  - Total matters by category".to_string(),
        "  - Active vs. inactive matters".to_string(),
        "  - Matters with pending tasks".to_string(),
        "  - Recommendations for follow-up".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_lists_six_prompts() {
        let names: Vec<String> = definitions().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "find-contact-by-phone",
                "matter-overview",
                "create-new-client",
                "daily-task-summary",
                "billing-report",
                "matter-search-analysis",
            ]
        );
    }

    #[test]
    fn phone_prompt_embeds_the_number() {
        let lines = find_contact_by_phone("555-0100");
        assert!(lines[0].contains("555-0100"));
        assert!(lines.iter().any(|l| l.contains("'search_contacts'")));
    }

    #[test]
    fn daily_summary_adds_assignee_filter_only_when_given() {
        let all = daily_task_summary("");
        assert!(all[0].ends_with("for all users"));
        assert!(!all.iter().any(|l| l.contains("assigned_to")));

        let one = daily_task_summary("u_7");
        assert!(one[0].ends_with("for user u_7"));
        assert!(one.iter().any(|l| l.contains("assigned_to: 'u_7'")));
    }

    #[test]
    fn billing_report_requires_a_subject() {
        let lines = billing_report("", "", "", "");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error:"));
    }

    #[test]
    fn billing_report_prefers_matter_over_contact() {
        let lines = billing_report("m_1", "c_1", "2025-01-01", "2025-01-31");
        assert!(lines[0].contains("matter m_1"));
        assert!(lines[0].contains("from 2025-01-01 to 2025-01-31"));
    }

    #[test]
    fn render_joins_lines_into_one_user_message() {
        let mut args = Map::new();
        args.insert("matter_id".to_string(), json!("m_9"));
        let result = render("matter-overview", Some(&args)).expect("known prompt");
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn render_rejects_unknown_names() {
        assert!(render("no-such-prompt", None).is_none());
    }
}
