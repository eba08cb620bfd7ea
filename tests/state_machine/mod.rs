mod deliverable_lifecycle;
mod transition_table;
