use crate::catalog::TaskCatalog;
use crate::session::SprintLog;
use crate::simulation::AllocationPlan;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

fn str_column(name: &'static str, values: Vec<&str>) -> Column {
    Series::new(PlSmallStr::from_static(name), values).into_column()
}

fn f64_column(name: &'static str, values: Vec<f64>) -> Column {
    Series::new(PlSmallStr::from_static(name), values).into_column()
}

impl SprintLog {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let entries = self.entries();
        let positions: Vec<u32> = (1..=entries.len() as u32).collect();
        let complexity: Vec<Option<&str>> = entries
            .iter()
            .map(|e| e.complexity.map(|c| c.label()))
            .collect();
        let phase: Vec<Option<&str>> = entries.iter().map(|e| e.phase.as_deref()).collect();

        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("#"), positions).into_column(),
            str_column("domain", entries.iter().map(|e| e.domain.as_str()).collect()),
            str_column("task", entries.iter().map(|e| e.task_name.as_str()).collect()),
            Series::new(PlSmallStr::from_static("complexity"), complexity).into_column(),
            Series::new(PlSmallStr::from_static("phase"), phase).into_column(),
            f64_column("units", entries.iter().map(|e| e.units).collect()),
            f64_column("cost", entries.iter().map(|e| e.cost).collect()),
        ])
    }
}

impl AllocationPlan {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let periods: Vec<u32> = self.assignments.iter().map(|a| a.period).collect();
        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("period"), periods).into_column(),
            str_column(
                "domain",
                self.assignments.iter().map(|a| a.domain.as_str()).collect(),
            ),
            str_column(
                "task",
                self.assignments.iter().map(|a| a.task_name.as_str()).collect(),
            ),
            f64_column("units", self.assignments.iter().map(|a| a.units).collect()),
        ])
    }
}

impl TaskCatalog {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let tasks = self.tasks();
        let index: Vec<u32> = (1..=tasks.len() as u32).collect();
        DataFrame::new(vec![
            Series::new(PlSmallStr::from_static("#"), index).into_column(),
            str_column("domain", tasks.iter().map(|t| t.domain.as_str()).collect()),
            str_column("task", tasks.iter().map(|t| t.name.as_str()).collect()),
            f64_column(
                "director_h",
                tasks.iter().map(|t| t.default_hours.director).collect(),
            ),
            f64_column(
                "leadership_h",
                tasks.iter().map(|t| t.default_hours.leadership).collect(),
            ),
            f64_column(
                "coordinator_h",
                tasks.iter().map(|t| t.default_hours.coordinator).collect(),
            ),
        ])
    }

    /// Catalog rows for one domain; `#` keeps the position in the full catalog.
    pub fn domain_dataframe(&self, domain: &str) -> PolarsResult<DataFrame> {
        let df = self.to_dataframe()?;
        let mask = df.column("domain")?.str()?.equal(domain);
        df.filter(&mask)
    }
}
