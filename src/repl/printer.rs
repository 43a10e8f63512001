// パス: src/repl/printer.rs
// 役割: Helpers for rendering the banner, help pages and loadable listings
// 意図: Keep interactive messaging consistent across commands
// 関連ファイル: src/repl/cmd.rs, src/builtins.rs, src/loadable/mod.rs
//! REPL で用いる定型メッセージと一覧表示を集約したモジュール。

use once_cell::sync::Lazy;

use crate::builtins::{BuiltinKind, BUILTINS};
use crate::display::DisplayMode;
use crate::loadable::{Catalog, Loadable};

pub const PROMPT: &str = "> ";

pub const WELCOME_TEXT: &str = concat!(
    "Nosper TTY - Open source terminal-based calculator.\n",
    "\n",
    "Type \"exit\" to exit, \"help\" for help, or \"morehelp\" for in-depth documentation.\n",
);

const COMMANDS_TEXT: &str = concat!(
    "Commands:\n",
    " exit               Exit the program\n",
    " help               Show this menu\n",
    " morehelp           Show detailed documentation on all functions\n",
    " ang                Display current angle mode\n",
    " rad                Switch to radians\n",
    " deg                Switch to degrees\n",
    " load <set>         Load a set of variables and functions (use listload to see available sets)\n",
    " unload <set>       Unload a previously loaded set\n",
    " listload           List loadable items\n",
    " loadinfo <set>     List data contained within a loadable\n",
    " dispnorm           Set display mode to normal\n",
    " dispsci [ndigits]  Set display mode to scientific with N digits after the decimal place (default 4)",
);

const OPERATORS_TEXT: &str = concat!(
    "Basic operators:\n",
    " Addition:          +\n",
    " Subtraction:       -\n",
    " Multiplication:    * (or write the operands next to each other)\n",
    " Division:          /\n",
    " Low-precedence division: //   (a // b c is a / (b c))\n",
    " Remainder:         %\n",
    " Exponentiation:    ** or ^\n",
    " Factorial:         !",
);

pub const HELP_TEXT: &str = concat!(
    "\nBasic usage\n",
    "-----------\n",
    "\n",
    "Commands:\n",
    " exit, help, morehelp, ang, rad, deg, load <set>, unload <set>,\n",
    " listload, loadinfo <set>, dispnorm, dispsci [ndigits]\n",
    "\n",
    "The calculator respects order of operations and brackets\n",
    "\n",
    "Example expressions:\n",
    " 1 + 2                      = 3\n",
    " 2 + 3 * 4                  = 14\n",
    " (2 + 3) * 4                = 20\n",
    " sin 1                      Calc sine of 1\n",
    " sin(1 + 2)                 Calc sine of complex expression\n",
    " myvalue = sin(1 + 2)       Set variable to value\n",
    " sqrt myvalue               Calc square root of variable\n",
    " a = b = 5                  Sets a and b to 5\n",
    "\n",
    "You can input numbers in a variety of ways:\n",
    " 10\n",
    " 0.5\n",
    " .5         = 0.5\n",
    " 5e3        = 5000\n",
    "\n",
    "Multiplication signs can be omitted in many situations:\n",
    " 10 (8 + 2)             = 100\n",
    " (1 + 2)(2 + 3)         = 15\n",
    " 2 pi                   = 6.283...\n",
    "\n",
    "Multiple expressions can be put on one line by separating them with semicolons\n",
    "(the value of the last expression is the one returned):\n",
    " 3 * 3; 4 * 4       = 16\n",
    " x = 3; x^2         = 9\n",
    "\n",
    "Results are printed on standard output, error messages on standard error.\n",
    "\n",
    "Enter \"morehelp\" for a full reference of functions and features",
);

/// `morehelp` の本文。定数・関数の一覧は組み込み定義から生成する。
pub static MORE_HELP_TEXT: Lazy<String> = Lazy::new(|| {
    let mut constants = String::new();
    let mut functions = String::new();
    for def in BUILTINS {
        match def.kind {
            BuiltinKind::Constant(_) => constants.push_str(&format!(
                " {:<22} {:<7} {}\n",
                def.description, def.name, def.example
            )),
            BuiltinKind::Function(_) => functions.push_str(&format!(
                " {:<28} {}\n",
                def.description, def.example
            )),
        }
    }
    format!(
        concat!(
            "\nDetailed documentation\n",
            "----------------------\n",
            "\n",
            "{commands}\n",
            "\n",
            "{operators}\n",
            "\n",
            "Input:\n",
            " Type an expression and press enter. Empty lines are ignored.\n",
            " Multiple expressions can be put on one line by separating them with semicolons.\n",
            " The value of the last expression is the one returned.\n",
            " Results go to standard output; error messages go to standard error.\n",
            "\n",
            "Memory:\n",
            " Variables:\n",
            "  Assign a variable like so:                    varname = 10\n",
            "  It can then be used in further calculations:  varname * 2\n",
            "  Assigning a name shadows any constant of the same name until it is reassigned.\n",
            "\n",
            " Functions:\n",
            "  Functions come from loadable sets (see listload).\n",
            "  A function with one argument can be called without brackets: sin 45\n",
            "  Other functions take bracketed, comma-separated arguments: grav(1, 2, 3)\n",
            "\n",
            " Previous answer:\n",
            "  Type \"ans\" to read the previous answer.\n",
            "  With several expressions on one line, ans is only updated at the end of the line:\n",
            "   5 + 5            = 10\n",
            "   2 + 2; ans + 2   = 12 (not 6)\n",
            "\n",
            "Inbuilt constants:\n",
            "{constants}",
            "\n",
            "Inbuilt functions (shown with example inputs):\n",
            "{functions}",
            "\n",
            "Trigonometric functions follow the angle mode (see ang, rad, deg).",
        ),
        commands = COMMANDS_TEXT,
        operators = OPERATORS_TEXT,
        constants = constants,
        functions = functions,
    )
});

/// `listload` の出力。
pub fn render_loadable_list(catalog: &Catalog) -> String {
    let mut s = String::from("Loadables:");
    if catalog.is_empty() {
        s.push_str("\n(none)");
    }
    for l in catalog.iter() {
        s.push_str(&format!("\n- {} ({})", l.name(), l.description()));
    }
    s
}

/// `loadinfo <set>` の出力。変数・関数は定義順。
pub fn render_loadable_info(loadable: &Loadable) -> String {
    let name = loadable.name();
    let mut s = format!("{} - {}", name, loadable.description());
    if !loadable.long_description().is_empty() {
        s.push('\n');
        s.push_str(loadable.long_description());
    }

    s.push_str(&format!("\n\nVariables in {}", name));
    if loadable.variables().is_empty() {
        s.push_str("\n(none)");
    }
    for (key, var) in loadable.variables() {
        s.push_str(&format!(
            "\n- {} ({}): {}",
            key,
            DisplayMode::Normal.format(var.value),
            var.description
        ));
    }

    s.push_str(&format!("\n\nFunctions in {}", name));
    if loadable.functions().is_empty() {
        s.push_str("\n(none)");
    }
    for (key, f) in loadable.functions() {
        s.push_str(&format!(
            "\n- {}({}): {}",
            key,
            f.params().join(", "),
            f.description
        ));
    }
    s
}
