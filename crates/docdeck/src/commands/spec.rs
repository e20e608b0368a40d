use colored::Colorize;

pub fn run(short: bool) {
    if short {
        print_quick_reference();
    } else {
        print_full_spec();
    }
}

fn print_quick_reference() {
    println!("{}", "docdeck quick reference".bold());
    println!();
    println!("{}", "Deck block".underline());
    println!("  ```slides");
    println!("  title: My Deck");
    println!("  nav:");
    println!("    - intro.md");
    println!("    - details.md");
    println!("  controls: full        # full | minimal | none (optional)");
    println!("  ```");
    println!();
    println!("{}", "Keys".underline());
    println!("  ← / PageUp            previous slide");
    println!("  → / PageDown / Space  next slide");
    println!("  O                     toggle overview");
    println!("  Esc                   close overview, then leave fullscreen");
}

fn print_full_spec() {
    println!("{}", "docdeck document format".bold());
    println!();
    println!("{}", "Documents".underline());
    println!("  A document is ordinary markdown. Every fenced ```slides block");
    println!("  becomes an interactive deck; text around the blocks is rendered");
    println!("  as prose. A document may contain any number of decks — each one");
    println!("  keeps its own position and mode, and keyboard input follows the");
    println!("  deck you last clicked or hovered.");
    println!();
    println!("{}", "Deck blocks".underline());
    println!("  title:     required display title");
    println!("  nav:       required list of slide files, one file per slide.");
    println!("             Paths resolve against the document's directory, then");
    println!("             its slides/ subdirectory. Missing files are skipped.");
    println!("  controls:  full (default) | minimal | none");
    println!();
    println!("{}", "Slides".underline());
    println!("  Each nav file is one slide: headings, paragraphs, lists, block");
    println!("  quotes, and fenced code blocks (highlighted by language). The");
    println!("  slide title is its first # heading.");
    println!();
    println!("{}", "Diagrams".underline());
    println!("  Fenced ```graph or ```mermaid blocks render asynchronously:");
    println!();
    println!("    ```graph");
    println!("    api[API Gateway]");
    println!("    api -> store: writes");
    println!("    cache -- api");
    println!("    ```");
    println!();
    println!("  A diagram that fails to render shows an inline error and never");
    println!("  blocks navigation.");
    println!();
    println!("{}", "Presenting".underline());
    println!("  ⛶ presents a deck fullscreen (landscape only — rotating to");
    println!("  portrait leaves presentation mode). On-screen controls hide");
    println!("  after three seconds of idle; any interaction brings them back.");
    println!("  ⊞ or O opens the overview grid; pick a tile to jump there.");
}
