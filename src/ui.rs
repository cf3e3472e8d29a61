use crate::date_key::{MIN_SUPPORTED_DATE, MONTHS};
use crate::models::EventRecord;
use crate::view::{ViewState, NO_INFORMATION};

pub fn render_index(view: &ViewState) -> String {
    let story = match view.event() {
        Some(event) => render_story(event),
        None => format!(r#"<p id="no-info" class="no-info">{NO_INFORMATION}</p>"#),
    };
    let views = view
        .view_count()
        .map(|count| count.to_string())
        .unwrap_or_else(|| "-".to_string());
    let image_error = view.image_error().map(escape_html).unwrap_or_default();

    INDEX_HTML
        .replace("{{LABEL}}", &view.label().to_string())
        .replace("{{DATE}}", &view.selected_date().to_string())
        .replace("{{MIN_DATE}}", &MIN_SUPPORTED_DATE.to_string())
        .replace("{{NO_INFO}}", NO_INFORMATION)
        .replace("{{MONTHS}}", &months_json())
        .replace("{{IMAGE_ERROR}}", &image_error)
        .replace("{{IMAGE_ERROR_HIDDEN}}", if view.image_error().is_some() { "" } else { "hidden" })
        .replace("{{VIEWS}}", &views)
        .replace("{{STORY}}", &story)
}

fn render_story(event: &EventRecord) -> String {
    let link = escape_html(&event.link);
    let img = escape_html(&event.img_source);
    let text = escape_html(&event.text_content);
    format!(
        r#"<a id="story-link" class="story" href="{link}" target="_blank" rel="noopener noreferrer">
        <figure>
          <img id="story-img" src="{img}" alt="Featured event" onerror="window.imageFailed(0)" />
          <figcaption><i>&copy; https://rte.ie/news</i></figcaption>
        </figure>
        <p id="story-text">{text}</p>
      </a>"#
    )
}

fn months_json() -> String {
    serde_json::to_string(&MONTHS).unwrap_or_else(|_| "[]".to_string())
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>This Day on RTE News</title>
  <style>
    :root {
      --bg: #f4f4f5;
      --ink: #1f2937;
      --badge: #facc15;
      --accent: #164e63;
      --card: #4b5563;
      --warn: #ef4444;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, "Segoe UI", sans-serif;
    }

    .app {
      max-width: 1024px;
      margin: 0 auto;
      padding: 16px;
    }

    h1 {
      margin: 24px 0;
      font-size: 2.2rem;
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    .badge {
      display: inline-block;
      background: var(--badge);
      color: black;
      border-radius: 8px;
      padding: 0 8px;
      margin-left: 12px;
      font-weight: 700;
    }

    .picker {
      position: relative;
      font-size: 0.9rem;
    }

    .picker button {
      border: none;
      border-radius: 999px;
      padding: 8px 24px;
      background: var(--accent);
      color: white;
      font-weight: 600;
      cursor: pointer;
    }

    .calendar {
      position: absolute;
      right: 0;
      top: 48px;
      z-index: 10;
      background: white;
      padding: 12px;
      border-radius: 8px;
      box-shadow: 0 16px 40px rgba(0, 0, 0, 0.25);
    }

    .story {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 16px;
      background: var(--card);
      color: white;
      border-radius: 6px;
      overflow: hidden;
      text-decoration: none;
    }

    figure {
      position: relative;
      margin: 0;
    }

    figure img {
      max-width: 100%;
      height: auto;
      display: block;
    }

    figcaption {
      position: absolute;
      bottom: 0;
      left: 0;
      padding: 8px;
      font-size: 0.8rem;
      background: rgba(31, 41, 55, 0.75);
    }

    .image-error {
      color: var(--warn);
      margin-top: 8px;
    }

    .footer {
      margin-top: 40px;
      padding: 16px;
      border-radius: 6px;
      background: #374151;
      color: white;
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>
      <span>This Day on RTE News:<span id="label" class="badge">{{LABEL}}</span></span>
      <span class="picker" id="picker">
        <button type="button" id="open-calendar">Different day</button>
        <span class="calendar" id="calendar" hidden>
          <input type="date" id="date-input" min="{{MIN_DATE}}" value="{{DATE}}" />
        </span>
      </span>
    </h1>

    <section id="story-area">
      <h2>Main Story That Day:</h2>
      <div id="story">
      {{STORY}}
      </div>
      <p id="image-error" class="image-error" {{IMAGE_ERROR_HIDDEN}}>{{IMAGE_ERROR}}</p>
    </section>

    <section class="footer">
      <h2>Project Explanation</h2>
      <p>
        A scraper records the main RTE News story every day. This page looks the
        story up by date and shows it with a link back to the original article.
      </p>
      <p>Page views: <strong id="views">{{VIEWS}}</strong></p>
    </section>
  </main>

  <script>
    const MIN_DATE = '{{MIN_DATE}}';
    const NO_INFO = "{{NO_INFO}}";
    const MONTHS = {{MONTHS}};

    const labelEl = document.getElementById('label');
    const storyEl = document.getElementById('story');
    const imageErrorEl = document.getElementById('image-error');
    const viewsEl = document.getElementById('views');
    const pickerEl = document.getElementById('picker');
    const calendarEl = document.getElementById('calendar');
    const dateInput = document.getElementById('date-input');

    let latestSeq = 0;

    const labelFor = (value) => {
      const [, month, day] = value.split('-').map(Number);
      return `${MONTHS[month - 1]} ${day}`;
    };

    window.imageFailed = (seq) => {
      if (seq !== latestSeq) {
        return;
      }
      imageErrorEl.textContent = 'Failed to load image';
      imageErrorEl.hidden = false;
    };

    const renderStory = (event) => {
      storyEl.replaceChildren();
      if (!event) {
        const p = document.createElement('p');
        p.id = 'no-info';
        p.textContent = NO_INFO;
        storyEl.appendChild(p);
        return;
      }

      const link = document.createElement('a');
      link.className = 'story';
      link.href = event.link;
      link.target = '_blank';
      link.rel = 'noopener noreferrer';

      const figure = document.createElement('figure');
      const img = document.createElement('img');
      img.src = event.imgSource;
      img.alt = 'Featured event';
      const seq = latestSeq;
      img.onerror = () => window.imageFailed(seq);
      const caption = document.createElement('figcaption');
      caption.innerHTML = '<i>&copy; https://rte.ie/news</i>';
      figure.append(img, caption);

      const text = document.createElement('p');
      text.textContent = event.textContent;
      link.append(figure, text);
      storyEl.appendChild(link);
    };

    const selectDate = async (value) => {
      if (!value || value < MIN_DATE) {
        return;
      }
      const seq = ++latestSeq;
      imageErrorEl.hidden = true;
      imageErrorEl.textContent = '';
      calendarEl.hidden = true;
      labelEl.textContent = labelFor(value);
      storyEl.replaceChildren();

      let day = null;
      try {
        const res = await fetch(`/api/days/${value}`);
        if (res.ok) {
          day = await res.json();
        }
      } catch (err) {
        console.error('Error fetching events:', err);
      }

      if (seq !== latestSeq) {
        return;
      }
      renderStory(day ? day.event : null);
    };

    document.getElementById('open-calendar').addEventListener('click', () => {
      calendarEl.hidden = false;
    });

    dateInput.addEventListener('change', () => selectDate(dateInput.value));

    document.addEventListener('mousedown', (event) => {
      if (!calendarEl.hidden && !pickerEl.contains(event.target)) {
        calendarEl.hidden = true;
      }
    });

    fetch('/api/views', { method: 'POST' }).catch(() => {});

    const counter = new EventSource('/api/views/stream');
    counter.addEventListener('count', (event) => {
      viewsEl.textContent = JSON.parse(event.data).count;
    });
    window.addEventListener('pagehide', () => counter.close());
  </script>
</body>
</html>
"#;
