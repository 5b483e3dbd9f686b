// Fake Package Pulse dashboard shared by the integration tests and the test-server binary.
// The markup mirrors the default selector tables in src/config.rs.

use axum::{
    Router,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
};
use tower_http::cors::CorsLayer;

/// Size of `/assets/huge.js`, above the default 1 MiB asset budget
pub const HUGE_ASSET_SIZE: usize = 1_200_000;

pub async fn create_app() -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/assets/app.js", get(app_js))
        .route("/assets/app.css", get(app_css))
        .route("/assets/logo.svg", get(logo_svg))
        .route("/assets/huge.js", get(huge_js))
        .layer(CorsLayer::permissive())
}

async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], APP_JS)
}

async fn app_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], APP_CSS)
}

async fn logo_svg() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], LOGO_SVG)
}

async fn huge_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        "/".repeat(HUGE_ASSET_SIZE),
    )
}

const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Package Pulse</title>
    <link rel="stylesheet" href="/assets/app.css">
    <script src="/assets/app.js" defer></script>
</head>
<body>
    <header class="flex">
        <a href="/" class="brand"><img src="/assets/logo.svg" alt="" width="24" height="24"> Package Pulse</a>
        <div id="theme-switch">
            <button type="button" aria-haspopup="menu"><label>Theme</label></button>
            <div id="theme-menu" role="menu" hidden>
                <div role="menuitem" data-theme="system">System</div>
                <div role="menuitem" data-theme="light">Light</div>
                <div role="menuitem" data-theme="dark">Dark</div>
            </div>
        </div>
    </header>

    <main>
        <form class="flex flex-col gap-4" autocomplete="off">
            <input id="search" type="text" placeholder="Search npm packages">
            <div role="listbox" hidden></div>
        </form>

        <section id="package-card" hidden>
            <div class="toolbar">
                <div class="period">
                    <button id="time-period-select" type="button" aria-haspopup="menu">All time</button>
                    <div id="period-menu" role="menu" hidden>
                        <div role="menuitem">All time</div>
                        <div role="menuitem">1 month</div>
                        <div role="menuitem">3 months</div>
                        <div role="menuitem">6 months</div>
                        <div role="menuitem">1 year</div>
                        <div role="menuitem">2 years</div>
                        <div role="menuitem">5 years</div>
                    </div>
                </div>
                <div role="radiogroup">
                    <button type="button" role="radio" aria-checked="true" aria-label="Toggle stats">Stats</button>
                    <button type="button" role="radio" aria-checked="false" aria-label="Toggle info">Info</button>
                </div>
            </div>

            <div role="application" class="chart">
                <svg width="600" height="300">
                    <g class="recharts-xAxis"></g>
                    <g class="recharts-yAxis"></g>
                    <polyline class="line" fill="none" stroke="#0ea5e9" stroke-width="2"
                        points="60,250 180,220 300,180 420,140 540,90"></polyline>
                </svg>
                <div class="recharts-tooltip-wrapper">
                    <p class="recharts-tooltip-label"></p>
                    <ul class="recharts-tooltip-item-list"></ul>
                </div>
            </div>

            <table>
                <thead><tr><th>Package</th><th>Weekly downloads</th><th>Trend</th></tr></thead>
                <tbody></tbody>
            </table>
        </section>
    </main>

    <footer class="mt-4 flex">
        <span>Download statistics from the npm registry</span>
    </footer>
</body>
</html>
"##;

const APP_CSS: &str = r##":root { color-scheme: light; font-family: sans-serif; }
body { margin: 0; background: Canvas; color: CanvasText; }
[hidden] { display: none !important; }
header.flex { display: flex; justify-content: space-between; align-items: center; padding: 12px 24px; }
.brand { display: flex; gap: 8px; align-items: center; color: inherit; text-decoration: none; }
#theme-switch, .period { position: relative; }
[role="menu"] { position: absolute; right: 0; z-index: 10; background: Canvas; border: 1px solid #888; }
.period [role="menu"] { left: 0; right: auto; }
[role="menuitem"] { padding: 4px 16px; cursor: pointer; white-space: nowrap; }
form.flex { display: flex; flex-direction: column; gap: 16px; position: relative; padding: 0 24px; }
#search { width: 320px; padding: 6px; }
[role="listbox"] { position: absolute; top: 36px; left: 24px; z-index: 5; min-width: 320px; background: Canvas; border: 1px solid #888; }
[role="option"] { padding: 4px 8px; cursor: pointer; }
#package-card { padding: 12px 24px; }
.toolbar { display: flex; gap: 16px; align-items: center; margin-bottom: 8px; }
.chart { position: relative; width: 600px; height: 300px; }
.recharts-tooltip-wrapper { position: absolute; top: 8px; left: 8px; visibility: hidden; pointer-events: none; background: Canvas; border: 1px solid #888; padding: 4px 8px; }
.recharts-tooltip-item-list { list-style: none; margin: 0; padding: 0; }
td.value { text-align: right; }
footer.mt-4.flex { display: flex; margin-top: 16px; padding: 12px 24px; }
"##;

const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><path d="M2 12h5l3-8 4 16 3-8h5" fill="none" stroke="#0ea5e9" stroke-width="2"/></svg>"##;

const APP_JS: &str = r##"(function () {
    const PACKAGES = ['react', 'react-dom', 'preact', 'vue', 'vue-router', 'playwright',
        'playwright-core', 'test', 'jest', 'typescript'];
    const DAY = 24 * 60 * 60 * 1000;
    const EPOCH = new Date(2016, 0, 1);

    const root = document.documentElement;
    const themeSwitch = document.getElementById('theme-switch');
    const themeMenu = document.getElementById('theme-menu');
    const form = document.querySelector('form');
    const input = document.getElementById('search');
    const listbox = document.querySelector('[role="listbox"]');
    const card = document.getElementById('package-card');
    const periodButton = document.getElementById('time-period-select');
    const periodMenu = document.getElementById('period-menu');
    const chart = document.querySelector('[role="application"]');
    const tooltip = document.querySelector('.recharts-tooltip-wrapper');
    let period = 'All time';

    const pad = (n) => String(n).padStart(2, '0');
    const ym = (d) => d.getFullYear() + '-' + pad(d.getMonth() + 1);
    const ymd = (d) => ym(d) + '-' + pad(d.getDate());
    const monthsBack = (n) => {
        const t = new Date();
        return new Date(t.getFullYear(), t.getMonth() - n, 1);
    };
    const MONTHS = { '3 months': 3, '6 months': 6, '1 year': 12, '2 years': 24, '5 years': 60 };
    const STEPS = { '3 months': 1, '6 months': 1, '1 year': 2, '2 years': 4, '5 years': 6 };

    function selected() {
        const raw = new URLSearchParams(window.location.search).get('projects');
        return raw ? raw.split(',').filter(Boolean) : [];
    }

    function rangeStart() {
        if (period === '1 month') return new Date(Date.now() - 28 * DAY);
        if (MONTHS[period]) return monthsBack(MONTHS[period]);
        return EPOCH;
    }

    function xTicks() {
        const out = [];
        if (period === '1 month') {
            for (let i = 28; i >= 0; i -= 4) out.push(ymd(new Date(Date.now() - i * DAY)));
        } else if (MONTHS[period]) {
            for (let i = MONTHS[period]; i >= 0; i -= STEPS[period]) out.push(ym(monthsBack(i)));
        } else {
            for (let y = EPOCH.getFullYear(); y <= new Date().getFullYear(); y++) out.push(y + '-01');
        }
        return out;
    }

    function downloads(day, offset) {
        const index = Math.floor((day.getTime() - EPOCH.getTime()) / DAY);
        return (250000 + Math.abs(index) * 137 + offset * 1000).toLocaleString('en-US');
    }

    function tickGroup(label, x, y, anchor) {
        return '<g class="recharts-cartesian-axis-tick"><text class="recharts-cartesian-axis-tick-value" x="' +
            x + '" y="' + y + '" text-anchor="' + anchor + '"><tspan>' + label + '</tspan></text></g>';
    }

    function renderChart() {
        const labels = xTicks();
        const step = 480 / Math.max(labels.length - 1, 1);
        chart.querySelector('.recharts-xAxis').innerHTML =
            labels.map((t, i) => tickGroup(t, 60 + i * step, 290, 'middle')).join('');
        chart.querySelector('.recharts-yAxis').innerHTML =
            ['0', '250K', '500K', '750K', '1M'].map((t, i) => tickGroup(t, 50, 270 - i * 60, 'end')).join('');
    }

    function renderTable(projects) {
        const today = new Date();
        card.querySelector('tbody').innerHTML = projects.map((p, i) =>
            '<tr><td>' + p + '</td><td class="value">' + downloads(today, i) + '</td>' +
            '<td><svg width="12" height="12"><path d="M6 1 L11 11 L1 11 Z" fill="#16a34a"></path></svg></td></tr>'
        ).join('');
    }

    function render() {
        const projects = selected();
        card.hidden = projects.length === 0;
        if (projects.length) {
            renderChart();
            renderTable(projects);
        }
    }

    function renderOptions() {
        const query = input.value.trim();
        if (!query) {
            listbox.hidden = true;
            return;
        }
        const matches = PACKAGES.filter((p) => p.includes(query));
        listbox.innerHTML = matches.length
            ? matches.map((p) => '<div role="option">' + p + '</div>').join('')
            : '<div>No project found.</div>';
        listbox.hidden = false;
    }

    function choose(name) {
        const projects = selected();
        if (!projects.includes(name)) projects.push(name);
        history.pushState({}, '', '/?projects=' + projects.join(','));
        input.value = '';
        listbox.hidden = true;
        render();
    }

    function applyTheme(theme) {
        const dark = theme === 'dark' ||
            (theme === 'system' && window.matchMedia('(prefers-color-scheme: dark)').matches);
        root.style.colorScheme = dark ? 'dark' : 'light';
    }

    themeSwitch.addEventListener('click', () => { themeMenu.hidden = !themeMenu.hidden; });
    themeMenu.querySelectorAll('[role="menuitem"]').forEach((item) => {
        item.addEventListener('click', (e) => {
            e.stopPropagation();
            applyTheme(item.dataset.theme);
            themeMenu.hidden = true;
        });
    });

    form.addEventListener('submit', (e) => e.preventDefault());
    input.addEventListener('input', renderOptions);
    input.addEventListener('click', renderOptions);
    listbox.addEventListener('click', (e) => {
        const option = e.target.closest('[role="option"]');
        if (option) choose(option.textContent.trim());
    });

    periodButton.addEventListener('click', () => { periodMenu.hidden = !periodMenu.hidden; });
    periodMenu.querySelectorAll('[role="menuitem"]').forEach((item) => {
        item.addEventListener('click', () => {
            period = item.textContent.trim();
            periodButton.textContent = period;
            periodMenu.hidden = true;
            renderChart();
        });
    });

    card.querySelectorAll('[role="radio"]').forEach((radio) => {
        radio.addEventListener('click', () => {
            card.querySelectorAll('[role="radio"]').forEach((r) =>
                r.setAttribute('aria-checked', String(r === radio)));
        });
    });

    chart.addEventListener('mousemove', (e) => {
        const rect = chart.getBoundingClientRect();
        const fraction = Math.min(Math.max((e.clientX - rect.left) / rect.width, 0), 1);
        const start = rangeStart().getTime();
        const day = new Date(start + fraction * (Date.now() - start));
        tooltip.querySelector('.recharts-tooltip-label').textContent = ymd(day);
        tooltip.querySelector('.recharts-tooltip-item-list').innerHTML = selected().map((p, i) =>
            '<li><span class="recharts-tooltip-item-name">' + p + '</span>: ' +
            '<span class="recharts-tooltip-item-value">' + downloads(day, i) + '</span></li>'
        ).join('');
        tooltip.style.visibility = 'visible';
    });
    chart.addEventListener('mouseleave', () => { tooltip.style.visibility = 'hidden'; });

    document.addEventListener('click', (e) => {
        if (!form.contains(e.target)) listbox.hidden = true;
        if (!themeSwitch.contains(e.target)) themeMenu.hidden = true;
        if (e.target !== periodButton && !periodMenu.contains(e.target)) periodMenu.hidden = true;
    });
    window.addEventListener('popstate', render);

    render();
})();
"##;
