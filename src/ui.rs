use crate::models::{ForecastOutcome, MetricCell, Summary};

pub fn render_index(summary: &Summary) -> String {
    let coverage = &summary.coverage;
    let daily = &summary.daily;

    INDEX_HTML
        .replace("{{AS_OF}}", &summary.as_of)
        .replace("{{FIRST_TOTAL}}", &coverage.first_dose_display)
        .replace("{{SECOND_TOTAL}}", &coverage.second_dose_display)
        .replace("{{FIRST_PCT}}", &coverage.first_dose_pct_display)
        .replace("{{SECOND_PCT}}", &coverage.second_dose_pct_display)
        .replace("{{REPORTING_DAY}}", &daily.reporting_day)
        .replace(
            "{{DAILY_CELLS}}",
            &[
                metric_cell("Vaccini Consegnati", "#29CF8A", &daily.delivered),
                metric_cell("Dosi Somministrate", "#376FDB", &daily.administered),
                metric_cell("Prime Dosi", "#F5C05F", &daily.first_dose),
                metric_cell("Persone Vaccinate", "#E83A8E", &daily.second_dose),
            ]
            .concat(),
        )
        .replace(
            "{{CATEGORY_CELLS}}",
            &summary
                .categories
                .iter()
                .map(|panel| metric_cell(panel.label, panel.color, &panel.doses))
                .collect::<String>(),
        )
        .replace("{{CATEGORY_DAY}}", &summary.categories_reporting_day)
        .replace(
            "{{AGE_ROWS}}",
            &summary
                .age_brackets
                .iter()
                .map(|point| {
                    format!(
                        "<tr><td>{}</td><td class=\"num\">{}</td></tr>",
                        point.bracket.label(),
                        point.total_display
                    )
                })
                .collect::<String>(),
        )
        .replace("{{BEST_DAY}}", &forecast_text(&summary.forecast.best_day))
        .replace("{{TRAILING_MONTH}}", &forecast_text(&summary.forecast.trailing_month))
}

fn metric_cell(label: &str, color: &str, metric: &MetricCell) -> String {
    format!(
        "<div class=\"stat\"><span class=\"label\">{label}</span>\
<span class=\"value\" style=\"color: {color}\">+ {}</span>\
<span class=\"total\" style=\"color: {color}\">Totali: {}</span></div>",
        metric.today_display, metric.total_display
    )
}

fn forecast_text(outcome: &ForecastOutcome) -> String {
    match (&outcome.target_date, &outcome.unavailable_reason) {
        (Some(date), _) => date.clone(),
        (None, Some(reason)) => format!("previsione non disponibile ({reason})"),
        (None, None) => "previsione non disponibile".to_string(),
    }
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="it">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=0.8, maximum-scale=1.2, minimum-scale=0.5" />
  <title>Dashboard Vaccini</title>
  <script src="https://cdn.plot.ly/plotly-basic-latest.min.js"></script>
  <style>
    :root {
      --bg: #f6f7fb;
      --ink: #23262f;
      --muted: #7a7f8c;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(35, 38, 47, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Helvetica Neue", Arial, sans-serif;
      padding: 32px 18px 48px;
    }

    main {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    section {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    h1, h2 {
      text-align: center;
      margin: 0 0 8px;
    }

    .note {
      text-align: center;
      color: var(--muted);
      font-style: italic;
      font-size: 14px;
      margin: 0 0 18px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat {
      display: grid;
      gap: 6px;
      text-align: center;
    }

    .stat .label {
      font-size: 14px;
    }

    .stat .value {
      font-size: 40px;
      font-weight: 700;
    }

    .stat .total {
      font-size: 14px;
      font-weight: 700;
    }

    .headline .value {
      font-size: 45px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td {
      padding: 6px 10px;
      border-bottom: 1px solid #eceef3;
    }

    td.num {
      text-align: right;
      font-variant-numeric: tabular-nums;
    }

    .chart {
      min-height: 360px;
    }
  </style>
</head>
<body>
  <main>
    <section class="headline">
      <div class="panel">
        <div class="stat">
          <span class="label">Prima dose</span>
          <span class="value" style="color: #F5C05F">{{FIRST_TOTAL}}</span>
          <span class="total" style="color: #F5C05F">{{FIRST_PCT}}% della popolazione</span>
        </div>
        <div class="stat">
          <span class="label">Persone Vaccinate</span>
          <span class="value" style="color: #E83A8E">{{SECOND_TOTAL}}</span>
          <span class="total" style="color: #E83A8E">{{SECOND_PCT}}% della popolazione</span>
        </div>
      </div>
      <div id="coverage-bar" class="chart"></div>
    </section>

    <section>
      <h1>Dati del Giorno</h1>
      <p class="note">dati aggiornati del {{REPORTING_DAY}} (calcolati il {{AS_OF}})</p>
      <div class="panel">{{DAILY_CELLS}}</div>
    </section>

    <section>
      <h2>Vaccini &amp; Dosi</h2>
      <div class="panel">
        <div id="supplier-chart" class="chart"></div>
        <div id="dose-chart" class="chart"></div>
      </div>
    </section>

    <section>
      <h2>Categorie</h2>
      <p class="note">dati del {{CATEGORY_DAY}}</p>
      <div class="panel">{{CATEGORY_CELLS}}</div>
      <div id="category-chart" class="chart"></div>
    </section>

    <section>
      <h2>Vaccini per fascia di et&agrave;</h2>
      <div class="panel">
        <table>{{AGE_ROWS}}</table>
        <div id="age-chart" class="chart"></div>
      </div>
    </section>

    <section>
      <h1>Previsioni</h1>
      <p class="note">Il modello utilizza i dati giornalieri sulle somministrazioni delle prime dosi</p>
      <p class="note">*Media basata sul valore massimo di prime dosi fatte in un giorno</p>
      <div class="panel">
        <div class="stat">
          <span class="label">Previsione Mensile</span>
          <span class="total">{{TRAILING_MONTH}}</span>
        </div>
        <div class="stat">
          <span class="label">Previsione Migliore*</span>
          <span class="total">{{BEST_DAY}}</span>
        </div>
      </div>
      <div id="forecast-chart" class="chart"></div>
    </section>

    <section>
      <h2>Effetti dei Vaccini nel Tempo</h2>
      <div class="panel">
        <div id="cases-chart" class="chart"></div>
        <div id="deaths-chart" class="chart"></div>
      </div>
    </section>
  </main>

  <script>
    const config = { displaylogo: false, displayModeBar: false, responsive: true };
    const sliderButtons = [
      { count: 1, label: '1m', step: 'month', stepmode: 'backward' },
      { count: 3, label: '3m', step: 'month', stepmode: 'backward' },
      { count: 6, label: '6m', step: 'month', stepmode: 'backward' },
      { step: 'all' }
    ];
    const dateAxis = {
      rangeselector: { buttons: sliderButtons },
      rangeslider: { visible: false },
      type: 'date'
    };

    const startLine = (series, height, color) => ({
      x: [series.campaign_start, series.campaign_start],
      y: [0, height],
      mode: 'lines',
      name: 'Inizio Vaccini',
      hoverinfo: 'none',
      line: { color }
    });

    const draw = (series) => {
      Plotly.newPlot('supplier-chart', series.suppliers.map((s) => ({
        x: s.dates, y: s.values, type: 'bar', name: s.name, marker: { color: s.color }
      })), { barmode: 'stack', xaxis: dateAxis }, config);

      Plotly.newPlot('dose-chart', [
        { x: series.dates, y: series.first_dose, type: 'bar', name: 'Prima Dose', marker: { color: '#F5C05F' } },
        { x: series.dates, y: series.second_dose, type: 'bar', name: 'Seconda Dose', marker: { color: '#78F5B3' } }
      ], { barmode: 'stack', xaxis: dateAxis }, config);

      Plotly.newPlot('category-chart', series.categories.map((c) => ({
        x: c.dates, y: c.values, type: 'bar', name: c.name, marker: { color: c.color }
      })), { barmode: 'stack', xaxis: dateAxis }, config);

      Plotly.newPlot('forecast-chart', [
        { x: series.dates, y: series.coverage, type: 'bar', name: 'Incremento Prime Dosi' }
      ].concat(series.forecast_lines.map((l) => ({
        x: l.x, y: l.y, mode: 'lines', name: l.name, line: { color: l.color }
      }))), {
        xaxis: { rangeslider: { visible: false }, type: 'date' },
        yaxis: { tickformat: ',.0%', range: [0, 1] }
      }, config);

      Plotly.newPlot('cases-chart', [
        { x: series.national.dates, y: series.national.new_cases, type: 'bar', name: 'Nuovi Positivi', marker: { color: '#D9615D' } },
        startLine(series, 40000, '#4F4747')
      ], { xaxis: dateAxis }, config);

      Plotly.newPlot('deaths-chart', [
        { x: series.national.dates, y: series.national.new_deaths, type: 'bar', name: 'Decessi', marker: { color: '#756B6B' } },
        startLine(series, 1000, '#1F1C1C')
      ], { xaxis: dateAxis }, config);
    };

    const drawSummary = (summary) => {
      Plotly.newPlot('coverage-bar', [{
        x: [summary.coverage.population, summary.coverage.first_dose_total, summary.coverage.second_dose_total],
        y: ['Popolazione', 'Prima dose', 'Vaccinati'],
        type: 'bar',
        orientation: 'h',
        marker: { color: ['#6181E8', '#F5C05F', '#E83A8E'] }
      }], { height: 240 }, config);

      Plotly.newPlot('age-chart', [{
        x: summary.age_brackets.map((a) => a.total_doses),
        y: summary.age_brackets.map((a) => a.bracket),
        type: 'bar',
        orientation: 'h',
        marker: { color: summary.age_brackets.map((a) => a.color) }
      }], { height: 340 }, config);
    };

    const load = async (path) => {
      const res = await fetch(path);
      if (!res.ok) {
        throw new Error(await res.text());
      }
      return res.json();
    };

    load('/api/series').then(draw).catch((err) => console.error(err));
    load('/api/summary').then(drawSummary).catch((err) => console.error(err));
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Datasets;
    use crate::stats::build_dashboard_at;
    use chrono::NaiveDate;

    #[test]
    fn index_fills_every_placeholder() {
        let today = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let dashboard = build_dashboard_at(today, &Datasets::default());
        let html = render_index(&dashboard.summary);

        assert!(!html.contains("{{"));
        assert!(html.contains("calcolati il 2021-03-01"));
        assert!(html.contains("dati aggiornati del 2021-02-28"));
        assert!(html.contains("0.00% della popolazione"));
        assert!(html.contains("Operatori Sanitari"));
        assert!(html.contains("<td>90+</td>"));
        assert!(html.contains("previsione non disponibile (no administration data)"));
    }
}
