use dashboard_core::{ConnectionState, LogLine};
use dioxus::prelude::*;
use shared_types::{TaskId, TaskStatus, TaskType};

use crate::dashboard::state::{indicator_class, ChartBar, DEFAULT_INPUT, LOG_MESSAGES_ID};

#[component]
pub fn ConnectionIndicator(state: ConnectionState) -> Element {
    rsx! {
        div {
            class: "connection-status",
            span { id: "status-indicator", class: indicator_class(state), "●" }
            span { class: "connection-label", "{state}" }
        }
    }
}

/// Comma-separated input plus task type. Validation happens in the session,
/// so this only forwards the raw text.
#[component]
pub fn ComputeForm(submitting: bool, on_submit: EventHandler<(String, TaskType)>) -> Element {
    let mut raw_input = use_signal(|| DEFAULT_INPUT.to_string());
    let mut task_type = use_signal(TaskType::default);

    let onsubmit = move |e: FormEvent| {
        e.prevent_default();
        on_submit.call((raw_input.read().clone(), task_type()));
    };

    rsx! {
        form {
            class: "compute-form",
            onsubmit,
            label { r#for: "data-input", "Input data" }
            input {
                id: "data-input",
                class: "data-input",
                r#type: "text",
                placeholder: "e.g. 1.5, 2, 3.25",
                value: "{raw_input}",
                oninput: move |e: FormEvent| raw_input.set(e.value()),
            }
            select {
                class: "task-type-select",
                value: task_type().as_str(),
                onchange: move |e: FormEvent| {
                    task_type.set(e.value().parse().unwrap_or_default());
                },
                for kind in TaskType::ALL {
                    option { key: "{kind}", value: kind.as_str(), {kind.label()} }
                }
            }
            button {
                class: "submit-button",
                r#type: "submit",
                disabled: submitting,
                if submitting { "Sending..." } else { "Compute" }
            }
        }
    }
}

#[component]
pub fn SeriesChart(bars: Vec<ChartBar>) -> Element {
    rsx! {
        div {
            class: "series-chart",
            if bars.is_empty() {
                div { class: "empty-state", "Submit data to see results" }
            } else {
                div {
                    class: "chart-legend",
                    span { class: "legend-swatch input-swatch" }
                    span { "Input Data" }
                    span { class: "legend-swatch result-swatch" }
                    span { "Result Data" }
                }
                div {
                    class: "chart-area",
                    for bar in bars.iter() {
                        div {
                            key: "{bar.label}",
                            class: "chart-group",
                            div {
                                class: "chart-bars",
                                div {
                                    class: "bar input-bar",
                                    title: "Input Data: {bar.input_text}",
                                    style: "height: {bar.input_height}%;",
                                }
                                if let Some(height) = bar.result_height {
                                    div {
                                        class: "bar result-bar",
                                        title: "Result Data: {bar.result_text}",
                                        style: "height: {height}%;",
                                    }
                                } else {
                                    div {
                                        class: "bar result-bar pending",
                                        title: "Result Data: pending",
                                        "{bar.result_text}"
                                    }
                                }
                            }
                            span { class: "chart-label", "{bar.label}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn LogPanel(lines: Vec<LogLine>, on_clear: EventHandler<()>) -> Element {
    rsx! {
        div {
            class: "log-panel",
            div {
                class: "log-header",
                span { "Event log" }
                button {
                    class: "clear-button",
                    onclick: move |_| on_clear.call(()),
                    "Clear"
                }
            }
            div {
                id: LOG_MESSAGES_ID,
                class: "log-messages",
                for line in lines.iter() {
                    div { key: "{line.seq}", class: "log-message", "{line}" }
                }
            }
        }
    }
}

#[component]
pub fn TaskList(entries: Vec<(TaskId, TaskStatus)>, active: Option<TaskId>) -> Element {
    rsx! {
        div {
            class: "task-list",
            if entries.is_empty() {
                div { class: "empty-state", "No tasks yet" }
            }
            for (task_id, status) in entries.iter() {
                div {
                    key: "{task_id}",
                    class: if active.as_ref() == Some(task_id) { "task-row active" } else { "task-row" },
                    span { class: "task-id", "{task_id}" }
                    span { class: "task-status status-{status}", "{status}" }
                }
            }
        }
    }
}

pub const DASHBOARD_STYLES: &str = r#"
.dashboard {
    display: grid;
    grid-template-columns: 2fr 1fr;
    gap: 1rem;
    max-width: 1200px;
    margin: 0 auto;
}

.dashboard-header {
    grid-column: 1 / -1;
    display: flex;
    align-items: center;
    justify-content: space-between;
}

.panel {
    background: #1e293b;
    border: 1px solid #334155;
    border-radius: 8px;
    padding: 1rem;
}

.connection-status {
    display: flex;
    align-items: center;
    gap: 0.5rem;
}

.status-indicator.connected { color: #22c55e; }
.status-indicator.connecting { color: #eab308; }
.status-indicator.disconnected { color: #ef4444; }

.compute-form {
    display: flex;
    flex-wrap: wrap;
    gap: 0.5rem;
    align-items: center;
}

.data-input {
    flex: 1;
    min-width: 12rem;
    padding: 0.5rem;
    background: #0f172a;
    color: #f8fafc;
    border: 1px solid #334155;
    border-radius: 4px;
}

.submit-button, .clear-button {
    padding: 0.5rem 1rem;
    background: #3b82f6;
    color: white;
    border: none;
    border-radius: 4px;
    cursor: pointer;
}

.submit-button:disabled {
    opacity: 0.5;
    cursor: not-allowed;
}

.chart-legend {
    display: flex;
    gap: 0.5rem;
    align-items: center;
    font-size: 0.875rem;
}

.legend-swatch {
    width: 0.75rem;
    height: 0.75rem;
    border-radius: 2px;
}

.input-swatch, .input-bar { background: rgba(54, 162, 235, 0.6); }
.result-swatch, .result-bar { background: rgba(255, 99, 132, 0.6); }

.chart-area {
    display: flex;
    align-items: flex-end;
    gap: 0.75rem;
    height: 240px;
    padding-top: 1rem;
    overflow-x: auto;
}

.chart-group {
    display: flex;
    flex-direction: column;
    align-items: center;
    height: 100%;
    min-width: 3rem;
}

.chart-bars {
    display: flex;
    align-items: flex-end;
    gap: 2px;
    flex: 1;
    width: 100%;
}

.bar {
    flex: 1;
    min-height: 1px;
}

.bar.pending {
    background: transparent;
    border: 1px dashed rgba(255, 99, 132, 0.6);
    color: #94a3b8;
    text-align: center;
    font-size: 0.75rem;
}

.chart-label {
    font-size: 0.75rem;
    color: #94a3b8;
}

.log-header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 0.5rem;
}

.log-messages {
    max-height: 320px;
    overflow-y: auto;
    font-family: monospace;
    font-size: 0.8rem;
}

.log-message {
    padding: 2px 0;
    border-bottom: 1px solid #1e293b;
}

.task-row {
    display: flex;
    justify-content: space-between;
    padding: 0.25rem 0.5rem;
    font-family: monospace;
}

.task-row.active { background: #334155; }
.status-completed { color: #22c55e; }
.status-started { color: #eab308; }
.status-error { color: #ef4444; }

.empty-state {
    color: #64748b;
    padding: 1rem;
    text-align: center;
}
"#;
