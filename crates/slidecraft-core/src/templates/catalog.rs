use super::{ModuleType, TextualTemplate};

#[allow(clippy::too_many_arguments)]
fn tpl(
    id: &str,
    module_type: ModuleType,
    function: &str,
    structure: &str,
    length_range: (usize, usize),
    tone: &str,
    example: &str,
    keywords: &[&str],
    semantic_description: &str,
) -> TextualTemplate {
    TextualTemplate {
        id: id.to_string(),
        module_type,
        function: function.to_string(),
        structure: structure.to_string(),
        length_range,
        tone: tone.to_string(),
        example: example.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        semantic_description: semantic_description.to_string(),
    }
}

pub(super) fn builtin_templates() -> Vec<TextualTemplate> {
    use ModuleType::*;

    vec![
        // ── Hooks ─────────────────────────────────────────────────────────────
        tpl(
            "H01", Hook,
            "Open with a provocative question",
            "{question}? {tension}",
            (40, 140), "provocative",
            "Still posting every day? That's why nobody remembers you.",
            &["question", "curiosity", "challenge"],
            "Opens with a provocative question that challenges the reader's assumptions and sparks curiosity",
        ),
        tpl(
            "H02", Hook,
            "Lead with a shocking number",
            "{number} {claim}. {twist}",
            (30, 120), "urgent",
            "90% of startups fail. Money is not the reason.",
            &["statistic", "number", "shock"],
            "Leads with a shocking number or statistic that stops the scroll and creates urgency",
        ),
        tpl(
            "H03", Hook,
            "Contradict a popular belief",
            "Everyone says {belief}. {contradiction}.",
            (40, 140), "bold",
            "Everyone says hustle harder. The data says rest more.",
            &["myth", "contrarian", "belief"],
            "Contradicts a popular belief or common advice with a bold contrarian statement",
        ),
        tpl(
            "H04", Hook,
            "Promise a concrete outcome",
            "How to {outcome} in {timeframe}",
            (30, 110), "inspirational",
            "How to double your reach in 30 days",
            &["promise", "outcome", "how to"],
            "Promises a concrete desirable outcome within a clear timeframe to motivate the reader",
        ),
        tpl(
            "H05", Hook,
            "Name the reader's pain",
            "If you {pain}, {promise}.",
            (40, 140), "empathetic",
            "If your posts get likes but no clients, read this.",
            &["pain", "empathy", "you"],
            "Names the reader's pain point directly so the target persona feels seen and understood",
        ),
        tpl(
            "H06", Hook,
            "Tease a list",
            "{count} {things} that {result}",
            (30, 110), "educational",
            "5 habits that quietly kill your focus",
            &["list", "count", "tips"],
            "Teases a numbered list of tips or habits that the carousel will reveal slide by slide",
        ),
        tpl(
            "H07", Hook,
            "Confess a mistake",
            "I {mistake}. Here's what it taught me.",
            (40, 130), "personal",
            "I wasted two years building the wrong product. Here's what it taught me.",
            &["story", "mistake", "lesson"],
            "Opens with a personal confession of a mistake that promises a hard-won lesson",
        ),
        tpl(
            "H08", Hook,
            "Issue a warning",
            "Stop {behavior} before {consequence}.",
            (30, 120), "urgent",
            "Stop chasing followers before it costs you your best clients.",
            &["warning", "stop", "risk"],
            "Issues an urgent warning to stop a harmful behavior before a costly consequence",
        ),
        // ── Value: data ───────────────────────────────────────────────────────
        tpl(
            "VD01", ValorDado,
            "Present a percentage statistic with its source",
            "{percentage} of {population} {finding}. (Source: {source})",
            (50, 180), "authoritative",
            "73% of failed startups cite lack of focus. (Source: CB Insights)",
            &["percentage", "statistic", "source", "credible"],
            "Presents a percentage statistic with a credible source to show the scale of a problem",
        ),
        tpl(
            "VD02", ValorDado,
            "Compare before and after numbers",
            "Before: {before}. After: {after}. {delta}",
            (50, 180), "analytical",
            "Before: 2% conversion. After: 7%. Same traffic.",
            &["comparison", "before", "after", "growth"],
            "Compares before and after numbers to quantify the change or improvement achieved",
        ),
        tpl(
            "VD03", ValorDado,
            "Highlight a trend over time",
            "In {period}, {metric} went from {start} to {end}.",
            (50, 180), "analytical",
            "In five years, remote jobs went from 4% to 28% of postings.",
            &["trend", "growth", "timeline", "metric"],
            "Highlights a trend over time with start and end values of a key metric",
        ),
        tpl(
            "VD04", ValorDado,
            "Translate a big number into something tangible",
            "{number} {unit}. That's {comparison}.",
            (40, 160), "surprising",
            "4 hours a day on email. That's two full months a year.",
            &["number", "scale", "comparison"],
            "Translates a large number into a tangible everyday comparison so the scale feels real",
        ),
        tpl(
            "VD05", ValorDado,
            "Cite research findings",
            "A {institution} study of {sample} found {finding}.",
            (60, 200), "authoritative",
            "A Harvard study of 700 teams found psychological safety predicts performance.",
            &["study", "research", "evidence", "source"],
            "Cites research findings from a credible institution or study as evidence",
        ),
        tpl(
            "VD06", ValorDado,
            "Rank items by a metric",
            "Top {count} {items} by {metric}: {ranking}",
            (60, 220), "educational",
            "Top 3 channels by ROI: email, referrals, SEO.",
            &["ranking", "top", "benchmark"],
            "Ranks items by a metric or benchmark to show which options perform best",
        ),
        // ── Value: insight ────────────────────────────────────────────────────
        tpl(
            "VI01", ValorInsight,
            "Reframe the problem",
            "The problem isn't {surface}. It's {root}.",
            (40, 160), "thoughtful",
            "The problem isn't your budget. It's your positioning.",
            &["reframe", "root cause", "perspective"],
            "Reframes the problem by revealing the real root cause behind the surface symptom",
        ),
        tpl(
            "VI02", ValorInsight,
            "State a counterintuitive truth",
            "{truth}. {explanation}",
            (50, 200), "bold",
            "Fewer posts grow faster. Attention compounds on depth, not volume.",
            &["counterintuitive", "truth", "paradox"],
            "States a counterintuitive truth and explains why it holds despite expectations",
        ),
        tpl(
            "VI03", ValorInsight,
            "Explain the mechanism behind the data",
            "Why {phenomenon}? Because {mechanism}.",
            (50, 200), "analytical",
            "Why do short videos win? Because completion rate feeds the algorithm.",
            &["why", "because", "mechanism", "data"],
            "Explains the mechanism or reason behind the data so the statistic becomes an insight",
        ),
        tpl(
            "VI04", ValorInsight,
            "Draw a lesson from a pattern",
            "Pattern: {pattern}. Lesson: {lesson}.",
            (50, 200), "educational",
            "Pattern: top creators reply to every comment. Lesson: community beats reach.",
            &["pattern", "lesson", "takeaway"],
            "Draws a practical lesson from a recurring pattern observed across many cases",
        ),
        tpl(
            "VI05", ValorInsight,
            "Contrast two mindsets",
            "{group_a} think {belief_a}. {group_b} know {belief_b}.",
            (50, 200), "provocative",
            "Amateurs think consistency means daily. Pros know it means predictable.",
            &["contrast", "mindset", "amateurs", "pros"],
            "Contrasts two mindsets or groups to show how experts think differently",
        ),
        tpl(
            "VI06", ValorInsight,
            "Reveal a hidden cost",
            "The hidden cost of {choice}: {cost}.",
            (40, 180), "serious",
            "The hidden cost of saying yes to everything: no time for what matters.",
            &["hidden", "cost", "tradeoff"],
            "Reveals a hidden cost or tradeoff of a common choice that people overlook",
        ),
        tpl(
            "VI07", ValorInsight,
            "Make an analogy",
            "{concept} is like {analogy}: {mapping}.",
            (50, 200), "conversational",
            "Your brand is like a garden: it needs pruning more than planting.",
            &["analogy", "metaphor", "like"],
            "Makes an analogy or metaphor that turns an abstract idea into something familiar",
        ),
        tpl(
            "VI08", ValorInsight,
            "Interpret what a statistic means for the reader",
            "{statistic} means {implication} for you.",
            (50, 200), "authoritative",
            "A 3-second attention span means your first line is your whole pitch.",
            &["interpretation", "implication", "statistic", "meaning"],
            "Interprets what a statistic or data point means in practice for the reader",
        ),
        // ── Value: solution ───────────────────────────────────────────────────
        tpl(
            "VS01", ValorSolucao,
            "Give a step-by-step method",
            "Step {n}: {action}. {detail}",
            (40, 200), "educational",
            "Step 1: audit your last 20 posts. Keep only what got saves.",
            &["step", "method", "process", "how"],
            "Gives a step-by-step method or process the reader can follow to solve the problem",
        ),
        tpl(
            "VS02", ValorSolucao,
            "Offer a framework",
            "Use the {name} framework: {components}.",
            (50, 220), "authoritative",
            "Use the 3C framework: clarity, consistency, community.",
            &["framework", "model", "system"],
            "Offers a named framework or mental model that structures the solution",
        ),
        tpl(
            "VS03", ValorSolucao,
            "Swap a bad habit for a good one",
            "Instead of {bad}, try {good}.",
            (40, 160), "encouraging",
            "Instead of posting daily, try one deep post a week.",
            &["instead", "swap", "habit", "try"],
            "Suggests swapping a bad habit for a better alternative the reader can try today",
        ),
        tpl(
            "VS04", ValorSolucao,
            "Provide a checklist",
            "Checklist: {item_1} / {item_2} / {item_3}",
            (50, 220), "practical",
            "Checklist: clear hook / one idea per slide / explicit CTA",
            &["checklist", "list", "practical"],
            "Provides a practical checklist of items to verify before acting",
        ),
        tpl(
            "VS05", ValorSolucao,
            "Recommend a tool or resource",
            "Tool: {tool}. Use it to {use_case}.",
            (40, 180), "practical",
            "Tool: a simple spreadsheet. Use it to track which hooks convert.",
            &["tool", "resource", "recommendation"],
            "Recommends a specific tool or resource and explains how to use it",
        ),
        tpl(
            "VS06", ValorSolucao,
            "Share a quick win",
            "Quick win: {action} in {time}.",
            (30, 140), "energetic",
            "Quick win: rewrite your bio in 10 minutes.",
            &["quick", "win", "fast", "easy"],
            "Shares a quick win the reader can achieve fast with minimal effort",
        ),
        tpl(
            "VS07", ValorSolucao,
            "Give a rule of thumb",
            "Rule of thumb: {rule}.",
            (30, 140), "authoritative",
            "Rule of thumb: one slide, one idea.",
            &["rule", "principle", "guideline"],
            "Gives a memorable rule of thumb or principle to guide decisions",
        ),
        tpl(
            "VS08", ValorSolucao,
            "Answer an objection with a fix",
            "\"{objection}\" → {solution}.",
            (40, 180), "empathetic",
            "\"I don't have time\" → batch everything on Sunday.",
            &["objection", "answer", "fix"],
            "Answers a common objection with a concrete fix that removes the obstacle",
        ),
        // ── Value: example ────────────────────────────────────────────────────
        tpl(
            "VE01", ValorExemplo,
            "Tell a mini case study",
            "{subject} {challenge}. They {action}. Result: {result}.",
            (60, 240), "narrative",
            "A bakery had empty mornings. They posted their 6am process. Result: a queue.",
            &["case study", "result", "story"],
            "Tells a mini case study of a real subject, the action taken and the result achieved",
        ),
        tpl(
            "VE02", ValorExemplo,
            "Show a famous example",
            "{famous} did {action}. {lesson}",
            (50, 220), "inspirational",
            "Airbnb took its own photos of listings. Bookings doubled.",
            &["famous", "brand", "example"],
            "Shows a famous brand or person as an example that proves the point",
        ),
        tpl(
            "VE03", ValorExemplo,
            "Before and after story",
            "Before: {before_state}. After {change}: {after_state}.",
            (60, 220), "narrative",
            "Before: 200 followers, no leads. After niching down: 3 clients a month.",
            &["before", "after", "transformation"],
            "Shows a before and after transformation story that makes the change concrete",
        ),
        tpl(
            "VE04", ValorExemplo,
            "Quote a customer",
            "\"{quote}\" — {person}",
            (40, 200), "personal",
            "\"I finally post without dread.\" — Ana, designer",
            &["quote", "testimonial", "customer"],
            "Quotes a customer or person whose testimonial illustrates the idea",
        ),
        tpl(
            "VE05", ValorExemplo,
            "Walk through a hypothetical scenario",
            "Imagine {scenario}. {consequence}.",
            (50, 220), "conversational",
            "Imagine every post brought one new client. Would you still post daily?",
            &["imagine", "scenario", "hypothetical"],
            "Walks through a hypothetical scenario so the reader can picture the idea applied",
        ),
        tpl(
            "VE06", ValorExemplo,
            "Show a personal example",
            "When I {situation}, I {action}. {outcome}.",
            (50, 220), "personal",
            "When I cut my posting to twice a week, I doubled engagement.",
            &["personal", "experience", "I"],
            "Shows a personal example from the author's own experience",
        ),
        // ── Calls to action ───────────────────────────────────────────────────
        tpl(
            "CTA01", Cta,
            "Ask the reader to save the post",
            "Save this for {moment}.",
            (20, 90), "friendly",
            "Save this for your next content planning session.",
            &["save", "bookmark"],
            "Asks the reader to save or bookmark the post for later reference",
        ),
        tpl(
            "CTA02", Cta,
            "Invite a comment",
            "Comment {keyword} and {reward}.",
            (20, 110), "conversational",
            "Comment PLAN and I'll send you the template.",
            &["comment", "engagement", "reply"],
            "Invites the reader to comment with a keyword in exchange for a reward",
        ),
        tpl(
            "CTA03", Cta,
            "Ask to share with someone",
            "Share this with {person} who {need}.",
            (20, 110), "friendly",
            "Share this with a founder who needs to hear it.",
            &["share", "send", "friend"],
            "Asks the reader to share the post with someone who needs it",
        ),
        tpl(
            "CTA04", Cta,
            "Point to a link or resource",
            "{offer} — link in bio.",
            (20, 100), "direct",
            "Free focus checklist — link in bio.",
            &["link", "bio", "download", "offer"],
            "Points to a link in bio or resource the reader can download",
        ),
        tpl(
            "CTA05", Cta,
            "Ask to follow for more",
            "Follow {handle} for {promise}.",
            (20, 100), "confident",
            "Follow @studio for weekly growth breakdowns.",
            &["follow", "more", "series"],
            "Asks the reader to follow the account for more content like this",
        ),
        tpl(
            "CTA06", Cta,
            "Prompt a reflective action",
            "{question} Start with {first_step} today.",
            (30, 130), "inspirational",
            "Which habit will you drop? Start with one today.",
            &["reflect", "action", "today"],
            "Prompts the reader to reflect and take one first step today",
        ),
        // ── Transitions ───────────────────────────────────────────────────────
        tpl(
            "T01", Transition,
            "Pivot from problem to solution",
            "So what actually works? {teaser}",
            (20, 100), "conversational",
            "So what actually works? Three things.",
            &["pivot", "solution", "but"],
            "Pivots the narrative from the problem to the solution with a short bridging question",
        ),
        tpl(
            "T02", Transition,
            "Build suspense before a reveal",
            "But here's the part nobody {verb}...",
            (20, 100), "dramatic",
            "But here's the part nobody talks about...",
            &["suspense", "reveal", "nobody"],
            "Builds suspense before a reveal so the reader keeps swiping",
        ),
        tpl(
            "T03", Transition,
            "Summarise before moving on",
            "Quick recap: {recap}. Now, {next}.",
            (30, 120), "educational",
            "Quick recap: focus beats volume. Now, how to apply it.",
            &["recap", "summary", "next"],
            "Summarises what came before and signals what comes next",
        ),
        tpl(
            "T04", Transition,
            "Shift to the personal",
            "Here's how this played out for {subject}.",
            (20, 100), "personal",
            "Here's how this played out for me.",
            &["story", "shift", "personal"],
            "Shifts from general advice to a personal or concrete story",
        ),
    ]
}
