//! Plain-text tables for the terminal.

use peek_core::{
    BusinessImpact, DailyAllocation, PolicyReport, SampleSize, SimulationReport, Tail, TestConfig,
};

pub fn render_sample_size(
    test: &TestConfig,
    sizes: &SampleSize,
    daily: Option<(u32, DailyAllocation)>,
) -> String {
    let tail = match test.tail {
        Tail::OneSided => "one-sided",
        Tail::TwoSided => "two-sided",
    };
    let mut out = String::new();
    out.push_str(&format!(
        "Sample size (alpha={}, power={}, {} test)\n",
        test.alpha, test.power, tail
    ));
    out.push_str(&format!(
        "   Rates:     control {:.4} -> treatment {:.4} (lift {:+.2}%)\n",
        test.baseline_rate,
        test.treatment_rate(),
        test.expected_lift * 100.0
    ));
    out.push_str(&format!("   Control:   {}\n", sizes.control));
    out.push_str(&format!("   Treatment: {}\n", sizes.treatment));
    out.push_str(&format!("   Total:     {}\n", sizes.total()));
    if let Some((days, allocation)) = daily {
        out.push_str(&format!(
            "   Per day over {} days: control {}, treatment {}\n",
            days, allocation.control, allocation.treatment
        ));
    }
    out
}

pub fn render_report(report: &SimulationReport) -> String {
    let sim = &report.config.simulation;
    let mut out = render_sample_size(
        &report.config.test,
        &report.sample_size,
        Some((report.config.test.test_days, report.daily_allocation)),
    );
    out.push_str(&format!(
        "\nSimulated {} experiments (seed {}, prior {:?})\n\n",
        sim.num_simulations, sim.seed, sim.effect_prior
    ));

    out.push_str(&format!(
        "{:<15} {:<14} {:>7} {:>9} {:>9} {:>10}\n",
        "policy", "true effect", "n", "correct", "reject", "mean stop"
    ));
    for policy in &report.policies {
        out.push_str(&render_partitions(policy));
    }

    out.push_str("\nBusiness impact (every reject is shipped)\n");
    out.push_str(&format!(
        "{:<15} {:>6} {:>6} {:>6} {:>11} {:>13} {:>11}\n",
        "policy", "wins", "true", "false", "true lift", "claimed lift", "total lift"
    ));
    for policy in &report.policies {
        out.push_str(&render_business(&policy.policy, &policy.business));
    }

    out.push_str("\nStopped per day\n");
    for policy in &report.policies {
        let days: Vec<String> = policy
            .stop_day_histogram
            .iter()
            .map(|count| count.to_string())
            .collect();
        out.push_str(&format!("{:<15} {}\n", policy.policy, days.join(" ")));
    }
    out
}

fn render_partitions(policy: &PolicyReport) -> String {
    let mut out = String::new();
    for summary in &policy.partitions {
        out.push_str(&format!(
            "{:<15} {:<14} {:>7} {:>8.1}% {:>8.1}% {:>10.2}\n",
            policy.policy,
            summary.partition.label(),
            summary.experiments,
            summary.accuracy * 100.0,
            summary.rejection_rate * 100.0,
            summary.mean_stop_day
        ));
    }
    out
}

fn render_business(policy: &str, business: &BusinessImpact) -> String {
    let pct = |v: Option<f64>| match v {
        Some(v) => format!("{:+.3}%", v),
        None => "-".to_string(),
    };
    format!(
        "{:<15} {:>6} {:>6} {:>6} {:>11} {:>13} {:>10.2}%\n",
        policy,
        business.wins,
        business.true_wins,
        business.false_wins,
        pct(business.mean_true_lift),
        pct(business.mean_observed_lift),
        business.cumulative_true_lift
    )
}
