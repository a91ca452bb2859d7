use crate::models::batch::ScanBatch;
use crate::models::opportunity::Opportunity;

#[allow(dead_code)]
pub fn opp(path: &[&str], profit_percent: f64) -> Opportunity {
    Opportunity {
        path: path.iter().map(ToString::to_string).collect(),
        pairs: Vec::new(),
        start_amount: Some(1000.0),
        end_amount: None,
        profit_percent: Some(profit_percent),
        end_coin: path.last().map(ToString::to_string),
        risk: None,
    }
}

#[allow(dead_code)]
pub fn batch(opportunities: Vec<Opportunity>) -> ScanBatch {
    ScanBatch::from_records(opportunities)
}
