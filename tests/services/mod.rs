mod factory_flows;
mod monitoring;
